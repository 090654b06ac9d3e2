//! Category repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use bozor_core::{CategoryId, Language, ListFilter, LocalizedText, ParamId, UserId};

use super::listing::{OrderColumns, push_localized, push_page, push_search};
use super::{RepositoryError, count_live, soft_delete};
use crate::models::Page;
use crate::models::category::{
    Category, CategoryParam, CategorySummary, CreateCategoryInput, UpdateCategoryInput,
};

const ORDER: OrderColumns = OrderColumns::new(
    "c.id DESC",
    &[
        ("id", "c.id"),
        ("name", "c.name"),
        ("status", "c.status"),
        ("created_at", "c.created_at"),
    ],
);

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategorySummaryRow {
    id: CategoryId,
    name: Option<String>,
    parent_id: Option<CategoryId>,
    parent_name: Option<String>,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<CategorySummaryRow> for CategorySummary {
    fn from(row: CategorySummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            parent_name: row.parent_name,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: Json<LocalizedText>,
    parent_id: Option<CategoryId>,
    status: bool,
    created_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self, language: Language, params: Vec<CategoryParam>) -> Category {
        let name = self.name.0;
        Category {
            id: self.id,
            name_localized: name.get(language).map(str::to_owned),
            name,
            parent_id: self.parent_id,
            status: self.status,
            created_at: self.created_at,
            params,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryParamRow {
    id: ParamId,
    kind: String,
    name: Option<String>,
}

impl From<CategoryParamRow> for CategoryParam {
    fn from(row: CategoryParamRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            name: row.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EditableCategoryRow {
    name: Json<LocalizedText>,
    parent_id: Option<CategoryId>,
    status: bool,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category. Status defaults to active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &CreateCategoryInput,
        actor: UserId,
    ) -> Result<CategoryId, RepositoryError> {
        let id = sqlx::query_scalar(
            r"
            INSERT INTO categories (name, parent_id, status, created_by)
            VALUES ($1, $2, COALESCE($3, TRUE), $4)
            RETURNING id
            ",
        )
        .bind(Json(&input.name))
        .bind(input.parent_id)
        .bind(input.status)
        .bind(actor)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Get a category with the params attached to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(
        &self,
        id: CategoryId,
        language: Language,
    ) -> Result<Option<Category>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, parent_id, status, created_at
            FROM categories
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let params = sqlx::query_as::<_, CategoryParamRow>(
            r"
            SELECT DISTINCT p.id, p.type AS kind, p.name ->> $2::text AS name
            FROM params p
            JOIN category_params cp ON cp.param_id = p.id
            WHERE $1 = ANY(cp.category_id)
              AND cp.deleted_at IS NULL
              AND p.deleted_at IS NULL
              AND p.status = TRUE
            ORDER BY p.id
            ",
        )
        .bind(id)
        .bind(language.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(row.into_category(
            language,
            params.into_iter().map(Into::into).collect(),
        )))
    }

    /// List categories, optionally only the children of `parent`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ListFilter,
        parent: Option<CategoryId>,
    ) -> Result<Page<CategorySummary>, RepositoryError> {
        let rows = list_query(filter, parent)
            .build_query_as::<CategorySummaryRow>()
            .fetch_all(self.pool)
            .await?;
        let count = count_live(self.pool, "categories").await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }

    /// Update a category, merging name variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live category has this id.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: CategoryId,
        input: UpdateCategoryInput,
        actor: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, EditableCategoryRow>(
            r"
            SELECT name, parent_id, status
            FROM categories
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
        let parent_id = input.parent_id.apply(current.parent_id);
        let status = input.status.unwrap_or(current.status);

        sqlx::query(
            r"
            UPDATE categories
            SET name = $1, parent_id = $2, status = $3, updated_at = NOW(), updated_by = $4
            WHERE id = $5
            ",
        )
        .bind(Json(&name))
        .bind(parent_id)
        .bind(status)
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Soft-delete a category. Children and products are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live category has this id.
    pub async fn delete(&self, id: CategoryId, actor: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "categories", id.as_i64(), actor).await
    }
}

fn list_query(filter: &ListFilter, parent: Option<CategoryId>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT c.id, ");
    push_localized(&mut qb, "c.name", filter.language);
    qb.push(" AS name, c.parent_id, ");
    push_localized(&mut qb, "pc.name", filter.language);
    qb.push(
        " AS parent_name, c.status, c.created_at \
         FROM categories c \
         LEFT JOIN categories pc ON pc.id = c.parent_id AND pc.deleted_at IS NULL \
         WHERE c.deleted_at IS NULL",
    );

    if let Some(parent) = parent {
        qb.push(" AND c.parent_id = ").push_bind(parent);
    }
    push_search(&mut qb, &["c.name"], filter);
    push_page(&mut qb, &ORDER, filter);
    qb
}

#[cfg(test)]
mod tests {
    use bozor_core::SortOrder;

    use super::*;

    #[test]
    fn test_list_query_children_of_parent() {
        let filter = ListFilter {
            order: SortOrder::parse("name asc"),
            limit: Some(5),
            ..ListFilter::default()
        };
        let qb = list_query(&filter, Some(CategoryId::new(3)));
        let sql = qb.sql();

        assert!(sql.starts_with("SELECT c.id, c.name ->> $1::text AS name"));
        assert!(sql.contains("pc.name ->> $2::text AS parent_name"));
        assert!(sql.contains("AND c.parent_id = $3"));
        assert!(sql.ends_with("ORDER BY c.name ASC LIMIT $4"));
    }

    #[test]
    fn test_category_name_in_request_language() {
        let row = || CategoryRow {
            id: CategoryId::new(4),
            name: Json(LocalizedText {
                en: Some("Clothes".to_owned()),
                ..LocalizedText::uz("Kiyim")
            }),
            parent_id: None,
            status: true,
            created_at: Utc::now(),
        };

        let category = row().into_category(Language::Uz, Vec::new());
        assert_eq!(category.name_localized.as_deref(), Some("Kiyim"));
        assert_eq!(category.name.en.as_deref(), Some("Clothes"));
        assert!(category.params.is_empty());

        assert_eq!(row().into_category(Language::Ru, Vec::new()).name_localized, None);
    }

    #[test]
    fn test_list_query_default_order() {
        let qb = list_query(&ListFilter::default(), None);
        assert!(!qb.sql().contains("parent_id = $"));
        assert!(qb.sql().ends_with("WHERE c.deleted_at IS NULL ORDER BY c.id DESC"));
    }
}
