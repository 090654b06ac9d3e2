//! Param and param value services.

use sqlx::PgPool;
use tracing::info;

use bozor_core::{ListFilter, ParamId, ParamValueId};

use super::{TokenValidator, authorize};
use crate::db::{ParamRepository, ParamValueRepository};
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::models::param::{CreateParamInput, Param, ParamSummary, UpdateParamInput};
use crate::models::param_value::{
    CreateParamValueInput, ParamValue, ParamValueSummary, UpdateParamValueInput,
};

// =============================================================================
// Params
// =============================================================================

/// Param operations.
pub struct ParamService<'a> {
    params: ParamRepository<'a>,
    tokens: &'a dyn TokenValidator,
}

impl<'a> ParamService<'a> {
    /// Create a new param service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator) -> Self {
        Self {
            params: ParamRepository::new(pool),
            tokens,
        }
    }

    /// Create a param attached to its categories.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for a
    /// missing name or type.
    pub async fn create(&self, token: &str, input: CreateParamInput) -> Result<ParamId> {
        let actor = authorize(self.tokens, token)?;
        input.name.ensure_present("name")?;
        if input.kind.trim().is_empty() {
            return Err(AppError::bad_request("type is required"));
        }

        let id = self.params.create(&input, actor.id).await?;
        info!(param_id = %id, user_id = %actor.id, "Param created");
        Ok(id)
    }

    /// Merge `input` into a param. A present `category_id` replaces the
    /// whole category list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the param does not exist.
    pub async fn update(&self, token: &str, id: ParamId, input: UpdateParamInput) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.params.update(id, input, actor.id).await?;
        info!(param_id = %id, user_id = %actor.id, "Param updated");
        Ok(())
    }

    /// Soft-delete a param together with its category links.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the param does not exist.
    pub async fn delete(&self, token: &str, id: ParamId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.params.delete(id, actor.id).await?;
        info!(param_id = %id, user_id = %actor.id, "Param deleted");
        Ok(())
    }

    /// A param with its category ids.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the param does not exist.
    pub async fn get(&self, id: ParamId) -> Result<Param> {
        self.params
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("not found".to_owned()))
    }

    /// List params.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<ParamSummary>> {
        Ok(self.params.list(filter).await?)
    }
}

// =============================================================================
// Param Values
// =============================================================================

/// Param value operations.
pub struct ParamValueService<'a> {
    values: ParamValueRepository<'a>,
    tokens: &'a dyn TokenValidator,
}

impl<'a> ParamValueService<'a> {
    /// Create a new param value service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator) -> Self {
        Self {
            values: ParamValueRepository::new(pool),
            tokens,
        }
    }

    /// Create a param value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for a
    /// name without any variant.
    pub async fn create(&self, token: &str, input: CreateParamValueInput) -> Result<ParamValueId> {
        let actor = authorize(self.tokens, token)?;
        input.name.ensure_present("name")?;

        let id = self.values.create(&input, actor.id).await?;
        info!(param_value_id = %id, user_id = %actor.id, "Param value created");
        Ok(id)
    }

    /// Merge `input` into a param value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the value does not exist.
    pub async fn update(
        &self,
        token: &str,
        id: ParamValueId,
        input: UpdateParamValueInput,
    ) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.values.update(id, input, actor.id).await?;
        info!(param_value_id = %id, user_id = %actor.id, "Param value updated");
        Ok(())
    }

    /// Soft-delete a param value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the value does not exist.
    pub async fn delete(&self, token: &str, id: ParamValueId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.values.delete(id, actor.id).await?;
        info!(param_value_id = %id, user_id = %actor.id, "Param value deleted");
        Ok(())
    }

    /// A single param value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the value does not exist.
    pub async fn get(&self, id: ParamValueId) -> Result<ParamValue> {
        self.values
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("not found".to_owned()))
    }

    /// List param values.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<ParamValueSummary>> {
        Ok(self.values.list(filter).await?)
    }

    /// List the values of one param.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_by_param(
        &self,
        param: ParamId,
        filter: &ListFilter,
    ) -> Result<Page<ParamValueSummary>> {
        let filter = ListFilter {
            param_id: Some(param),
            ..filter.clone()
        };
        self.list(&filter).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::{CategoryId, LocalizedText};
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::services::testing::FixedToken;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://bozor@localhost/bozor")
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_param_requires_type() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = ParamService::new(&pool, &tokens);

        let input = CreateParamInput {
            name: LocalizedText::uz("Rang"),
            kind: "  ".to_owned(),
            category_id: vec![CategoryId::new(1)],
            status: None,
        };
        let err = service.create("good", input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(message) if message == "type is required"));
    }

    #[tokio::test]
    async fn test_param_value_delete_requires_token() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = ParamValueService::new(&pool, &tokens);

        let err = service.delete("", ParamValueId::new(3)).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }
}
