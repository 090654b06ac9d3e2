//! Wishlist repository for database operations.
//!
//! Each customer has at most one live wishlist, enforced by a partial unique
//! index on `wishlists (customer_id) WHERE deleted_at IS NULL`. Adding the
//! same product twice creates two items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use bozor_core::{Language, ProductId, UserId, WishlistId, WishlistItemId};

use super::RepositoryError;
use crate::models::product::ProductImage;
use crate::models::wishlist::{Wishlist, WishlistItem};

/// One wishlist joined to one of its items (or none).
#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    wishlist_id: WishlistId,
    wishlist_created_at: DateTime<Utc>,
    item_id: Option<WishlistItemId>,
    product_id: Option<ProductId>,
    name: Option<String>,
    price: Option<Decimal>,
    images: Json<Vec<ProductImage>>,
    rating: Option<f32>,
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to the customer's wishlist, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        customer: UserId,
        product: ProductId,
    ) -> Result<WishlistId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let wishlist: WishlistId = sqlx::query_scalar(
            r"
            INSERT INTO wishlists (customer_id, status, created_by)
            VALUES ($1, TRUE, $1)
            ON CONFLICT (customer_id) WHERE deleted_at IS NULL
            DO UPDATE SET customer_id = EXCLUDED.customer_id
            RETURNING id
            ",
        )
        .bind(customer)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO wishlist_items (wishlist_id, product_id, created_by)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(wishlist)
        .bind(product)
        .bind(customer)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(wishlist)
    }

    /// Soft-delete an item of the customer's own wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no such live item.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_item(
        &self,
        customer: UserId,
        item: WishlistItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE wishlist_items wi
            SET deleted_at = NOW(), deleted_by = $1
            FROM wishlists w
            WHERE wi.id = $2
              AND wi.wishlist_id = w.id
              AND w.customer_id = $1
              AND wi.deleted_at IS NULL
              AND w.deleted_at IS NULL
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

    /// The customer's wishlists with their live items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        customer: UserId,
        language: Language,
    ) -> Result<Vec<Wishlist>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT w.id AS wishlist_id, w.created_at AS wishlist_created_at,
                   wi.id AS item_id, wi.product_id,
                   p.name ->> $2::text AS name,
                   p.price,
                   COALESCE(p.images, '[]'::jsonb) AS images,
                   p.rating_avg AS rating
            FROM wishlists w
            LEFT JOIN wishlist_items wi ON wi.wishlist_id = w.id AND wi.deleted_at IS NULL
            LEFT JOIN products p ON p.id = wi.product_id AND p.deleted_at IS NULL
            WHERE w.customer_id = $1 AND w.deleted_at IS NULL
            ORDER BY w.id, wi.id
            ",
        )
        .bind(customer)
        .bind(language.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(group_rows(rows))
    }
}

/// Fold rows ordered by wishlist into one entry per wishlist.
fn group_rows(rows: Vec<WishlistRow>) -> Vec<Wishlist> {
    let mut wishlists: Vec<Wishlist> = Vec::new();

    for row in rows {
        let item = match (row.item_id, row.product_id) {
            (Some(id), Some(product_id)) => Some(WishlistItem {
                id,
                product_id,
                name: row.name,
                price: row.price,
                images: row.images.0,
                rating: row.rating,
            }),
            _ => None,
        };

        match wishlists.last_mut() {
            Some(current) if current.id == row.wishlist_id => current.items.extend(item),
            _ => wishlists.push(Wishlist {
                id: row.wishlist_id,
                created_at: row.wishlist_created_at,
                items: item.into_iter().collect(),
            }),
        }
    }

    wishlists
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(wishlist: i64, item: Option<i64>) -> WishlistRow {
        WishlistRow {
            wishlist_id: WishlistId::new(wishlist),
            wishlist_created_at: Utc::now(),
            item_id: item.map(WishlistItemId::new),
            product_id: item.map(|_| ProductId::new(100)),
            name: Some("Choynak".to_owned()),
            price: Some(Decimal::new(9_900, 2)),
            images: Json(Vec::new()),
            rating: None,
        }
    }

    #[test]
    fn test_group_rows_per_wishlist() {
        let grouped = group_rows(vec![row(1, Some(10)), row(1, Some(11)), row(2, Some(12))]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.first().unwrap().items.len(), 2);
        assert_eq!(grouped.last().unwrap().items.len(), 1);
    }

    #[test]
    fn test_empty_wishlist_has_no_items() {
        let grouped = group_rows(vec![row(3, None)]);
        assert_eq!(grouped.len(), 1);
        assert!(grouped.first().unwrap().items.is_empty());
    }

    #[test]
    fn test_duplicate_products_are_kept() {
        let grouped = group_rows(vec![row(1, Some(10)), row(1, Some(11))]);
        let items = &grouped.first().unwrap().items;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.product_id == ProductId::new(100)));
    }
}
