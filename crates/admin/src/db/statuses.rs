//! Order and payment status repository.
//!
//! Both lookup tables share one schema; [`StatusKind`] selects the table.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use bozor_core::{ListFilter, LocalizedText, UserId};

use super::listing::{OrderColumns, push_localized, push_page, push_search};
use super::{RepositoryError, count_live, soft_delete};
use crate::models::Page;
use crate::models::status::{CreateStatusInput, StatusEntry, StatusSummary, UpdateStatusInput};

const ORDER: OrderColumns = OrderColumns::new(
    "s.id DESC",
    &[
        ("id", "s.id"),
        ("name", "s.name"),
        ("key", "s.key"),
        ("status", "s.status"),
        ("created_at", "s.created_at"),
    ],
);

/// Which status table to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// `order_statuses`.
    Order,
    /// `payment_statuses`.
    Payment,
}

impl StatusKind {
    /// The backing table.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Order => "order_statuses",
            Self::Payment => "payment_statuses",
        }
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StatusSummaryRow {
    id: i64,
    name: Option<String>,
    key: Option<String>,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<StatusSummaryRow> for StatusSummary {
    fn from(row: StatusSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            key: row.key,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusRow {
    id: i64,
    name: Json<LocalizedText>,
    key: Option<String>,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<StatusRow> for StatusEntry {
    fn from(row: StatusRow) -> Self {
        Self {
            id: row.id,
            name: row.name.0,
            key: row.key,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order and payment statuses.
pub struct StatusRepository<'a> {
    pool: &'a PgPool,
    kind: StatusKind,
}

impl<'a> StatusRepository<'a> {
    /// Create a repository over the table of `kind`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, kind: StatusKind) -> Self {
        Self { pool, kind }
    }

    /// Create a status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &CreateStatusInput, actor: UserId) -> Result<i64, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (name, key, status, created_by) \
             VALUES ($1, $2, COALESCE($3, TRUE), $4) RETURNING id",
            self.kind.table()
        );

        let id = sqlx::query_scalar(&sql)
            .bind(Json(&input.name))
            .bind(&input.key)
            .bind(input.status)
            .bind(actor)
            .fetch_one(self.pool)
            .await?;

        Ok(id)
    }

    /// Get a status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<StatusEntry>, RepositoryError> {
        let sql = format!(
            "SELECT id, name, key, status, created_at FROM {} \
             WHERE id = $1 AND deleted_at IS NULL",
            self.kind.table()
        );

        let row = sqlx::query_as::<_, StatusRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// List statuses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<StatusSummary>, RepositoryError> {
        let rows = list_query(self.kind, filter)
            .build_query_as::<StatusSummaryRow>()
            .fetch_all(self.pool)
            .await?;
        let count = count_live(self.pool, self.kind.table()).await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }

    /// Update a status, merging name variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live status has this id.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateStatusInput,
        actor: UserId,
    ) -> Result<(), RepositoryError> {
        let table = self.kind.table();
        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT id, name, key, status, created_at FROM {table} \
             WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        let current = sqlx::query_as::<_, StatusRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut name = current.name.0;
        if let Some(patch) = input.name {
            name.merge(patch);
        }

        let update = format!(
            "UPDATE {table} SET name = $1, key = $2, status = $3, \
             updated_at = NOW(), updated_by = $4 WHERE id = $5"
        );
        sqlx::query(&update)
            .bind(Json(&name))
            .bind(input.key.or(current.key))
            .bind(input.status.unwrap_or(current.status))
            .bind(actor)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Soft-delete a status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live status has this id.
    pub async fn delete(&self, id: i64, actor: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, self.kind.table(), id, actor).await
    }
}

fn list_query(kind: StatusKind, filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT s.id, ");
    push_localized(&mut qb, "s.name", filter.language);
    qb.push(" AS name, s.key, s.status, s.created_at FROM ")
        .push(kind.table())
        .push(" s WHERE s.deleted_at IS NULL");
    push_search(&mut qb, &["s.name"], filter);
    push_page(&mut qb, &ORDER, filter);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_selects_table() {
        let qb = list_query(StatusKind::Payment, &ListFilter::default());
        assert!(qb.sql().contains("FROM payment_statuses s WHERE"));

        let qb = list_query(StatusKind::Order, &ListFilter::default());
        assert!(qb.sql().contains("FROM order_statuses s WHERE"));
    }
}
