//! Order status and payment status services.

use sqlx::PgPool;
use tracing::info;

use bozor_core::ListFilter;

use super::{TokenValidator, authorize};
use crate::db::{StatusKind, StatusRepository};
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::models::status::{CreateStatusInput, StatusEntry, StatusSummary, UpdateStatusInput};

/// Operations on one of the status lookup tables.
pub struct StatusService<'a> {
    statuses: StatusRepository<'a>,
    kind: StatusKind,
    tokens: &'a dyn TokenValidator,
}

impl<'a> StatusService<'a> {
    /// Create a service over the `kind` table.
    #[must_use]
    pub const fn new(pool: &'a PgPool, kind: StatusKind, tokens: &'a dyn TokenValidator) -> Self {
        Self {
            statuses: StatusRepository::new(pool, kind),
            kind,
            tokens,
        }
    }

    /// Create a status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for a
    /// name without any variant.
    pub async fn create(&self, token: &str, input: CreateStatusInput) -> Result<i64> {
        let actor = authorize(self.tokens, token)?;
        input.name.ensure_present("name")?;

        let id = self.statuses.create(&input, actor.id).await?;
        info!(table = self.kind.table(), status_id = id, user_id = %actor.id, "Status created");
        Ok(id)
    }

    /// Merge `input` into a status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the status does not exist.
    pub async fn update(&self, token: &str, id: i64, input: UpdateStatusInput) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.statuses.update(id, input, actor.id).await?;
        info!(table = self.kind.table(), status_id = id, user_id = %actor.id, "Status updated");
        Ok(())
    }

    /// Soft-delete a status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the status does not exist.
    pub async fn delete(&self, token: &str, id: i64) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.statuses.delete(id, actor.id).await?;
        info!(table = self.kind.table(), status_id = id, user_id = %actor.id, "Status deleted");
        Ok(())
    }

    /// A single status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the status does not exist.
    pub async fn get(&self, id: i64) -> Result<StatusEntry> {
        self.statuses
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("not found".to_owned()))
    }

    /// List statuses.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<StatusSummary>> {
        Ok(self.statuses.list(filter).await?)
    }
}
