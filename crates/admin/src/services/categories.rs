//! Category service.

use sqlx::PgPool;
use tracing::info;

use bozor_core::{CategoryId, Language, ListFilter};

use super::{TokenValidator, authorize};
use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::models::category::{
    Category, CategorySummary, CreateCategoryInput, UpdateCategoryInput,
};

/// Category operations.
pub struct CategoryService<'a> {
    categories: CategoryRepository<'a>,
    tokens: &'a dyn TokenValidator,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
            tokens,
        }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for a
    /// name without any variant.
    pub async fn create(&self, token: &str, input: CreateCategoryInput) -> Result<CategoryId> {
        let actor = authorize(self.tokens, token)?;
        input.name.ensure_present("name")?;

        let id = self.categories.create(&input, actor.id).await?;
        info!(category_id = %id, user_id = %actor.id, "Category created");
        Ok(id)
    }

    /// Merge `input` into a category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category does not exist.
    pub async fn update(
        &self,
        token: &str,
        id: CategoryId,
        input: UpdateCategoryInput,
    ) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        if input.parent_id.value() == Some(&id) {
            return Err(AppError::bad_request("category cannot be its own parent"));
        }

        self.categories.update(id, input, actor.id).await?;
        info!(category_id = %id, user_id = %actor.id, "Category updated");
        Ok(())
    }

    /// Soft-delete a category. Children keep their parent reference.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category does not exist.
    pub async fn delete(&self, token: &str, id: CategoryId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.categories.delete(id, actor.id).await?;
        info!(category_id = %id, user_id = %actor.id, "Category deleted");
        Ok(())
    }

    /// A category with its params.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category does not exist.
    pub async fn get(&self, id: CategoryId, language: Language) -> Result<Category> {
        self.categories
            .get_by_id(id, language)
            .await?
            .ok_or_else(|| AppError::NotFound("not found".to_owned()))
    }

    /// List categories.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<CategorySummary>> {
        Ok(self.categories.list(filter, None).await?)
    }

    /// List the children of `parent`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_by_parent(
        &self,
        parent: CategoryId,
        filter: &ListFilter,
    ) -> Result<Page<CategorySummary>> {
        Ok(self.categories.list(filter, Some(parent)).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::{LocalizedText, Patch};
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::services::testing::FixedToken;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://bozor@localhost/bozor")
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_bad_token_before_database() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = CategoryService::new(&pool, &tokens);

        let input = CreateCategoryInput {
            name: LocalizedText::uz("Kiyim"),
            parent_id: None,
            status: None,
        };
        let err = service.create("bad", input).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn test_create_requires_a_name() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = CategoryService::new(&pool, &tokens);

        let input = CreateCategoryInput {
            name: LocalizedText::default(),
            parent_id: None,
            status: None,
        };
        let err = service.create("Bearer good", input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_self_parent() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = CategoryService::new(&pool, &tokens);

        let input = UpdateCategoryInput {
            name: None,
            status: None,
            parent_id: Patch::Value(CategoryId::new(4)),
        };
        let err = service
            .update("good", CategoryId::new(4), input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
