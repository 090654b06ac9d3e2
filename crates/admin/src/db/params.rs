//! Param repository for database operations.
//!
//! A param's categories live in a single `category_params` row holding an
//! array of category ids. It is written together with the param and replaced
//! as a whole.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use bozor_core::{CategoryId, ListFilter, LocalizedText, ParamId, UserId};

use super::listing::{OrderColumns, push_localized, push_page, push_search};
use super::{RepositoryError, count_live, soft_delete};
use crate::models::Page;
use crate::models::param::{CreateParamInput, Param, ParamSummary, UpdateParamInput};

const ORDER: OrderColumns = OrderColumns::new(
    "p.id DESC",
    &[
        ("id", "p.id"),
        ("name", "p.name"),
        ("param_name", "p.name"),
        ("type", "p.type"),
        ("status", "p.status"),
        ("created_at", "p.created_at"),
    ],
);

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ParamSummaryRow {
    id: ParamId,
    param_name: Option<String>,
    kind: String,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<ParamSummaryRow> for ParamSummary {
    fn from(row: ParamSummaryRow) -> Self {
        Self {
            id: row.id,
            param_name: row.param_name,
            kind: row.kind,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ParamRow {
    id: ParamId,
    name: Json<LocalizedText>,
    kind: String,
    status: bool,
    category_id: Vec<i64>,
    created_at: DateTime<Utc>,
}

impl From<ParamRow> for Param {
    fn from(row: ParamRow) -> Self {
        Self {
            id: row.id,
            name: row.name.0,
            kind: row.kind,
            status: row.status,
            category_id: row.category_id.into_iter().map(CategoryId::new).collect(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EditableParamRow {
    name: Json<LocalizedText>,
    kind: String,
    status: bool,
}

fn category_ids(ids: &[CategoryId]) -> Vec<i64> {
    ids.iter().map(CategoryId::as_i64).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for param database operations.
pub struct ParamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParamRepository<'a> {
    /// Create a new param repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a param and its category assignment in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either insert fails.
    pub async fn create(
        &self,
        input: &CreateParamInput,
        actor: UserId,
    ) -> Result<ParamId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: ParamId = sqlx::query_scalar(
            r"
            INSERT INTO params (name, type, status, created_by)
            VALUES ($1, $2, COALESCE($3, TRUE), $4)
            RETURNING id
            ",
        )
        .bind(Json(&input.name))
        .bind(&input.kind)
        .bind(input.status)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO category_params (category_id, param_id, status, created_by)
            VALUES ($1, $2, TRUE, $3)
            ",
        )
        .bind(category_ids(&input.category_id))
        .bind(id)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Get a param with its category list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ParamId) -> Result<Option<Param>, RepositoryError> {
        let row = sqlx::query_as::<_, ParamRow>(
            r"
            SELECT p.id, p.name, p.type AS kind, p.status,
                   COALESCE(cp.category_id, '{}'::bigint[]) AS category_id,
                   p.created_at
            FROM params p
            LEFT JOIN category_params cp ON cp.param_id = p.id AND cp.deleted_at IS NULL
            WHERE p.id = $1 AND p.deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List params, optionally only those assigned to `filter.category_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<ParamSummary>, RepositoryError> {
        let rows = list_query(filter)
            .build_query_as::<ParamSummaryRow>()
            .fetch_all(self.pool)
            .await?;
        let count = count_live(self.pool, "params").await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }

    /// Update a param. A present `category_id` replaces the whole list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live param has this id.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: ParamId,
        input: UpdateParamInput,
        actor: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, EditableParamRow>(
            r"
            SELECT name, type AS kind, status
            FROM params
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let mut name = current.name.0;
        if let Some(patch) = input.name {
            name.merge(patch);
        }

        sqlx::query(
            r"
            UPDATE params
            SET name = $1, type = $2, status = $3, updated_at = NOW(), updated_by = $4
            WHERE id = $5
            ",
        )
        .bind(Json(&name))
        .bind(input.kind.unwrap_or(current.kind))
        .bind(input.status.unwrap_or(current.status))
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(categories) = input.category_id {
            let categories = category_ids(&categories);
            let result = sqlx::query(
                r"
                UPDATE category_params
                SET category_id = $1, updated_at = NOW(), updated_by = $2
                WHERE param_id = $3 AND deleted_at IS NULL
                ",
            )
            .bind(&categories)
            .bind(actor)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                sqlx::query(
                    r"
                    INSERT INTO category_params (category_id, param_id, status, created_by)
                    VALUES ($1, $2, TRUE, $3)
                    ",
                )
                .bind(&categories)
                .bind(id)
                .bind(actor)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Soft-delete a param and its category assignment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live param has this id.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn delete(&self, id: ParamId, actor: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        soft_delete(&mut *tx, "params", id.as_i64(), actor).await?;

        sqlx::query(
            r"
            UPDATE category_params
            SET deleted_at = NOW(), deleted_by = $1
            WHERE param_id = $2 AND deleted_at IS NULL
            ",
        )
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn list_query(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT p.id, ");
    push_localized(&mut qb, "p.name", filter.language);
    qb.push(
        " AS param_name, p.type AS kind, p.status, p.created_at \
         FROM params p \
         LEFT JOIN category_params cp ON cp.param_id = p.id AND cp.deleted_at IS NULL \
         WHERE p.deleted_at IS NULL",
    );

    if let Some(category) = filter.category_id {
        qb.push(" AND ").push_bind(category).push(" = ANY(cp.category_id)");
    }
    push_search(&mut qb, &["p.name"], filter);
    push_page(&mut qb, &ORDER, filter);
    qb
}
