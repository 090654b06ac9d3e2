//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bozor_core::{CartId, CartItemId, ProductId};

use super::product::ProductImage;

/// A cart line joined to its product.
///
/// Product fields are empty when the product has since been deleted.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    /// Cart item ID.
    pub id: CartItemId,
    /// Owning cart.
    pub cart_id: CartId,
    /// Product in the cart.
    pub product_id: ProductId,
    /// Quantity.
    pub quantity: i32,
    /// Product name in the request language.
    pub name: Option<String>,
    /// Current product price.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Product images.
    pub images: Vec<ProductImage>,
    /// Product rating.
    pub rating: Option<f32>,
    /// When the item was added.
    pub created_at: DateTime<Utc>,
}

/// Input for adding a product to the acting customer's cart.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCartItemInput {
    /// Product to add.
    pub product_id: ProductId,
    /// Quantity, one when omitted.
    pub quantity: Option<i32>,
}

impl AddCartItemInput {
    /// The quantity to store.
    #[must_use]
    pub fn quantity_or_default(&self) -> i32 {
        self.quantity.unwrap_or(1)
    }
}

/// Input for changing a cart item.
///
/// An omitted quantity increments the current one by one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCartItemInput {
    /// New quantity.
    pub quantity: Option<i32>,
}
