//! Wishlist service.

use sqlx::PgPool;
use tracing::info;

use bozor_core::{Language, WishlistId, WishlistItemId};

use super::{TokenValidator, authorize};
use crate::db::WishlistRepository;
use crate::error::Result;
use crate::models::wishlist::{AddWishlistItemInput, Wishlist};

/// Wishlist operations, always on the acting customer's wishlist.
pub struct WishlistService<'a> {
    wishlists: WishlistRepository<'a>,
    tokens: &'a dyn TokenValidator,
}

impl<'a> WishlistService<'a> {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator) -> Self {
        Self {
            wishlists: WishlistRepository::new(pool),
            tokens,
        }
    }

    /// Add a product, creating the wishlist on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token.
    pub async fn add_item(&self, token: &str, input: AddWishlistItemInput) -> Result<WishlistId> {
        let actor = authorize(self.tokens, token)?;
        let wishlist = self.wishlists.add_item(actor.id, input.product_id).await?;
        info!(wishlist_id = %wishlist, product_id = %input.product_id, customer_id = %actor.id, "Wishlist item added");
        Ok(wishlist)
    }

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item is not on the acting
    /// customer's wishlist.
    pub async fn delete_item(&self, token: &str, item: WishlistItemId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.wishlists.delete_item(actor.id, item).await?;
        info!(wishlist_item_id = %item, customer_id = %actor.id, "Wishlist item deleted");
        Ok(())
    }

    /// The acting customer's wishlists with their items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token.
    pub async fn list(&self, token: &str, language: Language) -> Result<Vec<Wishlist>> {
        let actor = authorize(self.tokens, token)?;
        Ok(self.wishlists.list(actor.id, language).await?)
    }
}
