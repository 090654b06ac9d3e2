//! Role repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::lookup::Role;

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: bozor_core::RoleId,
    name: String,
    status: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// Repository for the `roles` lookup table.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List live roles by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Role>, RepositoryError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, status, created_at FROM roles WHERE deleted_at IS NULL ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Role {
                id: row.id,
                name: row.name,
                status: row.status,
                created_at: row.created_at,
            })
            .collect())
    }
}
