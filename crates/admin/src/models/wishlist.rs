//! Wishlist domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bozor_core::{ProductId, WishlistId, WishlistItemId};

use super::product::ProductImage;

/// A wishlist with its live items.
#[derive(Debug, Clone, Serialize)]
pub struct Wishlist {
    /// Wishlist ID.
    pub id: WishlistId,
    /// When the wishlist was created.
    pub created_at: DateTime<Utc>,
    /// Items, oldest first.
    pub items: Vec<WishlistItem>,
}

/// A wishlist entry joined to its product.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    /// Wishlist item ID.
    pub id: WishlistItemId,
    /// Wished product.
    pub product_id: ProductId,
    /// Product name in the request language.
    pub name: Option<String>,
    /// Current product price.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Product images.
    pub images: Vec<ProductImage>,
    /// Product rating.
    pub rating: Option<f32>,
}

/// Input for adding a product to the acting customer's wishlist.
#[derive(Debug, Clone, Deserialize)]
pub struct AddWishlistItemInput {
    /// Product to add.
    pub product_id: ProductId,
}
