//! Wishlist route handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;

use bozor_core::WishlistItemId;

use super::extract::{JsonBody, Lang, PathId};
use super::response::{self, ApiResponse};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Page;
use crate::models::wishlist::{AddWishlistItemInput, Wishlist};
use crate::services::WishlistService;
use crate::state::AppState;

/// Build the wishlist router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/wishlist", get(list))
        .route("/admin/wishlist/create", post(add_item))
        .route("/admin/wishlist/delete/{id}", delete(remove_item))
}

/// The acting customer's wishlists with their items.
#[instrument(skip_all)]
pub async fn list(
    auth: RequireAuth,
    State(state): State<AppState>,
    Lang(language): Lang,
) -> Result<ApiResponse<Vec<Wishlist>>> {
    let wishlists = WishlistService::new(state.pool(), state.tokens())
        .list(&auth.token, language)
        .await?;
    let count = i64::try_from(wishlists.len()).unwrap_or(i64::MAX);
    Ok(response::page(Page::new(wishlists, count)))
}

/// Add a product to the acting customer's wishlist.
#[instrument(skip_all, fields(product_id = %input.product_id))]
pub async fn add_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<AddWishlistItemInput>,
) -> Result<ApiResponse<()>> {
    let wishlist_id = WishlistService::new(state.pool(), state.tokens())
        .add_item(&auth.token, input)
        .await?;
    Ok(response::created(StatusCode::OK, wishlist_id))
}

/// Remove an item from the acting customer's wishlist.
#[instrument(skip_all, fields(wishlist_item_id = %id))]
pub async fn remove_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<WishlistItemId>,
) -> Result<ApiResponse<()>> {
    WishlistService::new(state.pool(), state.tokens())
        .delete_item(&auth.token, id)
        .await?;
    Ok(response::ok())
}
