//! Cart repository for database operations.
//!
//! Each customer has at most one live cart, enforced by a partial unique
//! index on `carts (customer_id) WHERE deleted_at IS NULL`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use bozor_core::{CartId, CartItemId, ListFilter, ProductId, UserId};

use super::listing::{OrderColumns, push_localized, push_page};
use super::{RepositoryError, count_live};
use crate::models::Page;
use crate::models::cart::CartItem;
use crate::models::product::ProductImage;

const ORDER: OrderColumns = OrderColumns::new(
    "ci.id DESC",
    &[
        ("id", "ci.id"),
        ("quantity", "ci.quantity"),
        ("created_at", "ci.created_at"),
    ],
);

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    cart_id: CartId,
    product_id: ProductId,
    quantity: i32,
    name: Option<String>,
    price: Option<Decimal>,
    images: Json<Vec<ProductImage>>,
    rating: Option<f32>,
    created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
            name: row.name,
            price: row.price,
            images: row.images.0,
            rating: row.rating,
            created_at: row.created_at,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to the customer's cart, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        customer: UserId,
        product: ProductId,
        quantity: i32,
    ) -> Result<CartId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart = live_cart(&mut *tx, customer).await?;

        sqlx::query(
            r"
            INSERT INTO cart_items (cart_id, product_id, quantity, created_by)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(cart)
        .bind(product)
        .bind(quantity)
        .bind(customer)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(cart)
    }

    /// Set an item's quantity, or increment it by one when `quantity` is
    /// `None`. Only items in the customer's own cart can be changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no such live item.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_item(
        &self,
        customer: UserId,
        item: CartItemId,
        quantity: Option<i32>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items ci
            SET quantity = COALESCE($1, ci.quantity + 1), updated_at = NOW(), updated_by = $2
            FROM carts c
            WHERE ci.id = $3
              AND ci.cart_id = c.id
              AND c.customer_id = $2
              AND ci.deleted_at IS NULL
              AND c.deleted_at IS NULL
            ",
        )
        .bind(quantity)
        .bind(customer)
        .bind(item)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Soft-delete an item of the customer's own cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no such live item.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_item(&self, customer: UserId, item: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items ci
            SET deleted_at = NOW(), deleted_by = $1
            FROM carts c
            WHERE ci.id = $2
              AND ci.cart_id = c.id
              AND c.customer_id = $1
              AND ci.deleted_at IS NULL
              AND c.deleted_at IS NULL
            ",
        )
        .bind(customer)
        .bind(item)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List live cart items, optionally of one customer.
    ///
    /// Items whose product was deleted are kept with empty product fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<CartItem>, RepositoryError> {
        let rows = list_query(filter)
            .build_query_as::<CartItemRow>()
            .fetch_all(self.pool)
            .await?;
        let count = count_live(self.pool, "cart_items").await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }
}

/// Return the customer's live cart, creating it if missing.
async fn live_cart(conn: &mut PgConnection, customer: UserId) -> Result<CartId, RepositoryError> {
    let id = sqlx::query_scalar(
        r"
        INSERT INTO carts (customer_id, created_by)
        VALUES ($1, $1)
        ON CONFLICT (customer_id) WHERE deleted_at IS NULL
        DO UPDATE SET customer_id = EXCLUDED.customer_id
        RETURNING id
        ",
    )
    .bind(customer)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

fn list_query(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ");
    push_localized(&mut qb, "p.name", filter.language);
    qb.push(
        " AS name, p.price, COALESCE(p.images, '[]'::jsonb) AS images, \
         p.rating_avg AS rating, ci.created_at \
         FROM cart_items ci \
         JOIN carts c ON c.id = ci.cart_id AND c.deleted_at IS NULL \
         LEFT JOIN products p ON p.id = ci.product_id AND p.deleted_at IS NULL \
         WHERE ci.deleted_at IS NULL",
    );

    if let Some(customer) = filter.customer_id {
        qb.push(" AND c.customer_id = ").push_bind(customer);
    }
    push_page(&mut qb, &ORDER, filter);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_left_joins_products() {
        let qb = list_query(&ListFilter::default());
        let sql = qb.sql();

        assert!(sql.contains("LEFT JOIN products p ON p.id = ci.product_id"));
        assert!(sql.ends_with("WHERE ci.deleted_at IS NULL ORDER BY ci.id DESC"));
    }
}
