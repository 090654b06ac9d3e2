//! Product repository for database operations.
//!
//! Param selections are stored as `(product_id, param_id, value_id)` rows in
//! `product_param_values`. Writing a product always writes its selections in
//! the same transaction; an update that carries selections retires the old
//! rows before inserting the new ones.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use bozor_core::{
    CategoryId, ListFilter, LocalizedText, ParamId, ParamValueId, ProductId, UserId,
};

use super::listing::{OrderColumns, push_localized, push_page, push_search};
use super::{RepositoryError, count_live, soft_delete};
use crate::models::Page;
use crate::models::product::{
    ParamSelection, Product, ProductFields, ProductImage, ProductSummary, Seller,
    UpdateProductInput,
};

const ORDER: OrderColumns = OrderColumns::new(
    "p.id DESC",
    &[
        ("id", "p.id"),
        ("name", "p.name"),
        ("price", "p.price"),
        ("stock_quantity", "p.stock_quantity"),
        ("discount_percent", "p.discount_percent"),
        ("rating_avg", "p.rating_avg"),
        ("views_count", "p.views_count"),
        ("status", "p.status"),
        ("created_at", "p.created_at"),
    ],
);

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductSummaryRow {
    id: ProductId,
    name: Option<String>,
    description: Option<String>,
    price: Decimal,
    stock_quantity: i64,
    category_id: Option<CategoryId>,
    category_name: Option<String>,
    discount_percent: i16,
    images: Json<Vec<ProductImage>>,
    rating_avg: Option<f32>,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductSummaryRow> for ProductSummary {
    fn from(row: ProductSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            category_id: row.category_id,
            category_name: row.category_name,
            discount_percent: row.discount_percent,
            images: row.images.0,
            rating_avg: row.rating_avg,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: Json<LocalizedText>,
    description: Json<LocalizedText>,
    price: Decimal,
    stock_quantity: i64,
    category_id: Option<CategoryId>,
    discount_percent: i16,
    images: Json<Vec<ProductImage>>,
    rating_avg: Option<f32>,
    views_count: i64,
    seller_id: Option<UserId>,
    status: bool,
    created_at: DateTime<Utc>,
    seller_first_name: Option<String>,
    seller_last_name: Option<String>,
    seller_avatar: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct EditableProductRow {
    name: Json<LocalizedText>,
    description: Json<LocalizedText>,
    price: Decimal,
    stock_quantity: i64,
    category_id: Option<CategoryId>,
    discount_percent: i16,
    images: Json<Vec<ProductImage>>,
    seller_id: Option<UserId>,
    status: bool,
}

impl From<EditableProductRow> for ProductFields {
    fn from(row: EditableProductRow) -> Self {
        Self {
            name: row.name.0,
            description: row.description.0,
            price: row.price,
            stock_quantity: row.stock_quantity,
            category_id: row.category_id,
            discount_percent: row.discount_percent,
            images: row.images.0,
            seller_id: row.seller_id,
            status: row.status,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SelectionRow {
    param_id: ParamId,
    value_ids: Vec<i64>,
}

impl From<SelectionRow> for ParamSelection {
    fn from(row: SelectionRow) -> Self {
        Self {
            param_id: row.param_id,
            value_ids: row.value_ids.into_iter().map(ParamValueId::new).collect(),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

/// Writable columns of a live product, locked until the transaction ends.
const LOCK_EDITABLE: &str = r"
    SELECT name, description, price, stock_quantity, category_id,
           discount_percent, images, seller_id, status
    FROM products
    WHERE id = $1 AND deleted_at IS NULL
    FOR UPDATE
";

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product with its param selections in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(
        &self,
        fields: &ProductFields,
        params: &[ParamSelection],
        actor: UserId,
    ) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products (
                name, description, price, stock_quantity, category_id,
                discount_percent, images, seller_id, status, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(Json(&fields.name))
        .bind(Json(&fields.description))
        .bind(fields.price)
        .bind(fields.stock_quantity)
        .bind(fields.category_id)
        .bind(fields.discount_percent)
        .bind(Json(&fields.images))
        .bind(fields.seller_id)
        .bind(fields.status)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;

        insert_selections(&mut *tx, id, params, actor).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Apply `input` to a live product and append `uploaded` image paths,
    /// replacing its selections when `input.params` is present.
    ///
    /// The row is locked for the whole read-merge-write, so concurrent
    /// updates of one product apply one after the other. Returns the images
    /// dropped by `input.remove_images`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live product has this id.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &UpdateProductInput,
        uploaded: Vec<String>,
        actor: UserId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut fields: ProductFields = sqlx::query_as::<_, EditableProductRow>(LOCK_EDITABLE)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .into();

        let removed = fields.apply(input, uploaded);

        sqlx::query(
            r"
            UPDATE products
            SET name = $1, description = $2, price = $3, stock_quantity = $4,
                category_id = $5, discount_percent = $6, images = $7,
                seller_id = $8, status = $9, updated_at = NOW(), updated_by = $10
            WHERE id = $11
            ",
        )
        .bind(Json(&fields.name))
        .bind(Json(&fields.description))
        .bind(fields.price)
        .bind(fields.stock_quantity)
        .bind(fields.category_id)
        .bind(fields.discount_percent)
        .bind(Json(&fields.images))
        .bind(fields.seller_id)
        .bind(fields.status)
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(params) = input.params.as_deref() {
            sqlx::query(
                r"
                UPDATE product_param_values
                SET deleted_at = NOW(), deleted_by = $1
                WHERE product_id = $2 AND deleted_at IS NULL
                ",
            )
            .bind(actor)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            insert_selections(&mut *tx, id, params, actor).await?;
        }

        tx.commit().await?;
        Ok(removed)
    }

    /// Get a product with its param selections.
    ///
    /// With `detail`, seller name and avatar are included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(
        &self,
        id: ProductId,
        detail: bool,
    ) -> Result<Option<Product>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.description, p.price, p.stock_quantity,
                   p.category_id, p.discount_percent, p.images, p.rating_avg,
                   p.views_count, p.seller_id, p.status, p.created_at,
                   u.first_name AS seller_first_name,
                   u.last_name AS seller_last_name,
                   u.avatar AS seller_avatar
            FROM products p
            LEFT JOIN users u ON u.id = p.seller_id
            WHERE p.id = $1 AND p.deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let params = sqlx::query_as::<_, SelectionRow>(
            r"
            SELECT param_id, array_agg(value_id ORDER BY value_id) AS value_ids
            FROM product_param_values
            WHERE product_id = $1 AND deleted_at IS NULL
            GROUP BY param_id
            ORDER BY param_id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let seller = detail.then(|| Seller {
            first_name: row.seller_first_name,
            last_name: row.seller_last_name,
            avatar: row.seller_avatar,
        });

        Ok(Some(Product {
            id: row.id,
            name: row.name.0,
            description: row.description.0,
            price: row.price,
            stock_quantity: row.stock_quantity,
            category_id: row.category_id,
            discount_percent: row.discount_percent,
            images: row.images.0,
            rating_avg: row.rating_avg,
            views_count: row.views_count,
            seller_id: row.seller_id,
            status: row.status,
            created_at: row.created_at,
            params: params.into_iter().map(Into::into).collect(),
            seller,
        }))
    }

    /// List products, optionally within `filter.category_id`.
    ///
    /// Search matches the product name or the category name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<ProductSummary>, RepositoryError> {
        let rows = list_query(filter)
            .build_query_as::<ProductSummaryRow>()
            .fetch_all(self.pool)
            .await?;
        let count = count_live(self.pool, "products").await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }

    /// Soft-delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live product has this id.
    pub async fn delete(&self, id: ProductId, actor: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "products", id.as_i64(), actor).await
    }
}

/// Insert one `product_param_values` row per selected value.
async fn insert_selections(
    conn: &mut PgConnection,
    product: ProductId,
    params: &[ParamSelection],
    actor: UserId,
) -> Result<(), RepositoryError> {
    let Some(mut qb) = selections_query(product, params, actor) else {
        return Ok(());
    };
    qb.build().execute(conn).await?;
    Ok(())
}

fn selections_query(
    product: ProductId,
    params: &[ParamSelection],
    actor: UserId,
) -> Option<QueryBuilder<'static, Postgres>> {
    let triples: Vec<(ParamId, ParamValueId)> = params
        .iter()
        .flat_map(|selection| {
            selection
                .value_ids
                .iter()
                .map(move |value| (selection.param_id, *value))
        })
        .collect();

    if triples.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new(
        "INSERT INTO product_param_values (product_id, param_id, value_id, created_by) ",
    );
    qb.push_values(triples, |mut row, (param, value)| {
        row.push_bind(product)
            .push_bind(param)
            .push_bind(value)
            .push_bind(actor);
    });
    Some(qb)
}

fn list_query(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT p.id, ");
    push_localized(&mut qb, "p.name", filter.language);
    qb.push(" AS name, ");
    push_localized(&mut qb, "p.description", filter.language);
    qb.push(" AS description, p.price, p.stock_quantity, p.category_id, ");
    push_localized(&mut qb, "c.name", filter.language);
    qb.push(
        " AS category_name, p.discount_percent, p.images, p.rating_avg, p.status, p.created_at \
         FROM products p \
         LEFT JOIN categories c ON c.id = p.category_id AND c.deleted_at IS NULL \
         WHERE p.deleted_at IS NULL",
    );

    if let Some(category) = filter.category_id {
        qb.push(" AND p.category_id = ").push_bind(category);
    }
    push_search(&mut qb, &["p.name", "c.name"], filter);
    push_page(&mut qb, &ORDER, filter);
    qb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::SortOrder;

    use super::*;

    #[test]
    fn test_selections_expand_to_triples() {
        let params = vec![
            ParamSelection {
                param_id: ParamId::new(1),
                value_ids: vec![ParamValueId::new(10), ParamValueId::new(11)],
            },
            ParamSelection {
                param_id: ParamId::new(2),
                value_ids: vec![ParamValueId::new(20)],
            },
        ];
        let qb = selections_query(ProductId::new(7), &params, UserId::new(3)).unwrap();

        assert_eq!(
            qb.sql(),
            "INSERT INTO product_param_values (product_id, param_id, value_id, created_by) \
             VALUES ($1, $2, $3, $4), ($5, $6, $7, $8), ($9, $10, $11, $12)"
        );
    }

    #[test]
    fn test_update_locks_the_row() {
        assert!(LOCK_EDITABLE.trim_end().ends_with("FOR UPDATE"));
        assert!(LOCK_EDITABLE.contains("deleted_at IS NULL"));
    }

    #[test]
    fn test_no_selections_means_no_insert() {
        assert!(selections_query(ProductId::new(1), &[], UserId::new(1)).is_none());

        let empty = vec![ParamSelection {
            param_id: ParamId::new(1),
            value_ids: Vec::new(),
        }];
        assert!(selections_query(ProductId::new(1), &empty, UserId::new(1)).is_none());
    }

    #[test]
    fn test_list_query_accepts_plus_separated_order() {
        let filter = ListFilter {
            order: SortOrder::parse("price+desc"),
            category_id: Some(CategoryId::new(9)),
            ..ListFilter::default()
        };
        let qb = list_query(&filter);
        let sql = qb.sql();

        assert!(sql.contains("AND p.category_id = $4"));
        assert!(sql.ends_with("ORDER BY p.price DESC"));
    }

    #[test]
    fn test_list_query_searches_product_and_category_names() {
        let filter = ListFilter {
            search: Some("telefon".to_owned()),
            ..ListFilter::default()
        };
        let qb = list_query(&filter);
        assert!(qb.sql().contains(
            "AND (p.name ->> $4::text ILIKE '%' || $5 || '%' OR c.name ->> $6::text ILIKE '%' || $7 || '%')"
        ));
    }
}
