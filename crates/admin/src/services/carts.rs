//! Cart service.

use sqlx::PgPool;
use tracing::info;

use bozor_core::{CartId, CartItemId, ListFilter};

use super::{TokenValidator, authorize};
use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::models::cart::{AddCartItemInput, CartItem, UpdateCartItemInput};

/// Cart operations.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    tokens: &'a dyn TokenValidator,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator) -> Self {
        Self {
            carts: CartRepository::new(pool),
            tokens,
        }
    }

    /// Add a product to the acting customer's cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for a
    /// non-positive quantity.
    pub async fn add_item(&self, token: &str, input: AddCartItemInput) -> Result<CartId> {
        let actor = authorize(self.tokens, token)?;
        let quantity = input.quantity_or_default();
        check_quantity(Some(quantity))?;

        let cart = self
            .carts
            .add_item(actor.id, input.product_id, quantity)
            .await?;
        info!(cart_id = %cart, product_id = %input.product_id, customer_id = %actor.id, "Cart item added");
        Ok(cart)
    }

    /// Set an item's quantity, or increment it when no quantity is given.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item is not in the acting
    /// customer's cart.
    pub async fn update_item(
        &self,
        token: &str,
        item: CartItemId,
        input: UpdateCartItemInput,
    ) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        check_quantity(input.quantity)?;

        self.carts.update_item(actor.id, item, input.quantity).await?;
        info!(cart_item_id = %item, customer_id = %actor.id, "Cart item updated");
        Ok(())
    }

    /// Remove an item from the acting customer's cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item is not in the acting
    /// customer's cart.
    pub async fn delete_item(&self, token: &str, item: CartItemId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.carts.delete_item(actor.id, item).await?;
        info!(cart_item_id = %item, customer_id = %actor.id, "Cart item deleted");
        Ok(())
    }

    /// List cart items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<CartItem>> {
        Ok(self.carts.list(filter).await?)
    }
}

fn check_quantity(quantity: Option<i32>) -> Result<()> {
    if quantity.is_some_and(|quantity| quantity <= 0) {
        return Err(AppError::bad_request("quantity must be positive"));
    }
    Ok(())
}
