//! Cart route handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use tracing::instrument;

use bozor_core::CartItemId;

use super::extract::{JsonBody, Listing, PathId};
use super::response::{self, ApiResponse};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::cart::{AddCartItemInput, CartItem, UpdateCartItemInput};
use crate::services::CartService;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart/list", get(list))
        .route("/cart/create", post(add_item))
        .route("/cart/item/{id}/update", patch(update_item))
        .route("/cart/item/delete/{id}", delete(remove_item))
}

/// List live cart items.
#[instrument(skip_all)]
pub async fn list(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Vec<CartItem>>> {
    let page = CartService::new(state.pool(), state.tokens())
        .list(&filter)
        .await?;
    Ok(response::page(page))
}

/// Add a product to the acting customer's cart.
#[instrument(skip_all, fields(product_id = %input.product_id))]
pub async fn add_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<AddCartItemInput>,
) -> Result<ApiResponse<()>> {
    let cart_id = CartService::new(state.pool(), state.tokens())
        .add_item(&auth.token, input)
        .await?;
    Ok(response::created(StatusCode::OK, cart_id))
}

/// Set a cart item's quantity, or bump it by one.
#[instrument(skip_all, fields(cart_item_id = %id))]
pub async fn update_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<CartItemId>,
    JsonBody(input): JsonBody<UpdateCartItemInput>,
) -> Result<ApiResponse<()>> {
    CartService::new(state.pool(), state.tokens())
        .update_item(&auth.token, id, input)
        .await?;
    Ok(response::ok())
}

/// Soft-delete a cart item.
#[instrument(skip_all, fields(cart_item_id = %id))]
pub async fn remove_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<CartItemId>,
) -> Result<ApiResponse<()>> {
    CartService::new(state.pool(), state.tokens())
        .delete_item(&auth.token, id)
        .await?;
    Ok(response::ok())
}
