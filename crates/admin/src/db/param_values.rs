//! Param value repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use bozor_core::{ListFilter, LocalizedText, ParamId, ParamValueId, UserId};

use super::listing::{OrderColumns, push_localized, push_page, push_search};
use super::{RepositoryError, count_live, soft_delete};
use crate::models::Page;
use crate::models::param_value::{
    CreateParamValueInput, ParamValue, ParamValueSummary, UpdateParamValueInput,
};

const ORDER: OrderColumns = OrderColumns::new(
    "pv.id DESC",
    &[
        ("id", "pv.id"),
        ("name", "pv.name"),
        ("param_id", "pv.param_id"),
        ("status", "pv.status"),
        ("created_at", "pv.created_at"),
    ],
);

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ParamValueSummaryRow {
    id: ParamValueId,
    name: Option<String>,
    param_id: ParamId,
    param_name: Option<String>,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<ParamValueSummaryRow> for ParamValueSummary {
    fn from(row: ParamValueSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            param_id: row.param_id,
            param_name: row.param_name,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ParamValueRow {
    id: ParamValueId,
    name: Json<LocalizedText>,
    param_id: ParamId,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<ParamValueRow> for ParamValue {
    fn from(row: ParamValueRow) -> Self {
        Self {
            id: row.id,
            name: row.name.0,
            param_id: row.param_id,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for param value database operations.
pub struct ParamValueRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParamValueRepository<'a> {
    /// Create a new param value repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a param value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &CreateParamValueInput,
        actor: UserId,
    ) -> Result<ParamValueId, RepositoryError> {
        let id = sqlx::query_scalar(
            r"
            INSERT INTO param_values (name, param_id, status, created_by)
            VALUES ($1, $2, COALESCE($3, TRUE), $4)
            RETURNING id
            ",
        )
        .bind(Json(&input.name))
        .bind(input.param_id)
        .bind(input.status)
        .bind(actor)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Get a param value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ParamValueId) -> Result<Option<ParamValue>, RepositoryError> {
        let row = sqlx::query_as::<_, ParamValueRow>(
            r"
            SELECT id, name, param_id, status, created_at
            FROM param_values
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List param values, optionally only those of `filter.param_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ListFilter,
    ) -> Result<Page<ParamValueSummary>, RepositoryError> {
        let rows = list_query(filter)
            .build_query_as::<ParamValueSummaryRow>()
            .fetch_all(self.pool)
            .await?;
        let count = count_live(self.pool, "param_values").await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }

    /// Update a param value, merging name variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live value has this id.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: ParamValueId,
        input: UpdateParamValueInput,
        actor: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ParamValueRow>(
            r"
            SELECT id, name, param_id, status, created_at
            FROM param_values
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
            UPDATE param_values
            SET name = $1, param_id = $2, status = $3, updated_at = NOW(), updated_by = $4
            WHERE id = $5
            ",
        )
        .bind(Json(&name))
        .bind(input.param_id.unwrap_or(current.param_id))
        .bind(input.status.unwrap_or(current.status))
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Soft-delete a param value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live value has this id.
    pub async fn delete(&self, id: ParamValueId, actor: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "param_values", id.as_i64(), actor).await
    }
}

fn list_query(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT pv.id, ");
    push_localized(&mut qb, "pv.name", filter.language);
    qb.push(" AS name, pv.param_id, ");
    push_localized(&mut qb, "p.name", filter.language);
    qb.push(
        " AS param_name, pv.status, pv.created_at \
         FROM param_values pv \
         LEFT JOIN params p ON p.id = pv.param_id AND p.deleted_at IS NULL \
         WHERE pv.deleted_at IS NULL",
    );

    if let Some(param) = filter.param_id {
        qb.push(" AND pv.param_id = ").push_bind(param);
    }
    push_search(&mut qb, &["pv.name"], filter);
    push_page(&mut qb, &ORDER, filter);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_by_param() {
        let filter = ListFilter {
            param_id: Some(ParamId::new(4)),
            offset: Some(10),
            ..ListFilter::default()
        };
        let qb = list_query(&filter);
        let sql = qb.sql();

        assert!(sql.contains("AND pv.param_id = $3"));
        assert!(sql.ends_with("ORDER BY pv.id DESC OFFSET $4"));
    }
}
