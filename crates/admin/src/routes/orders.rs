//! Order route handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use tracing::instrument;

use bozor_core::{OrderId, OrderItemId};

use super::extract::{JsonBody, Lang, Listing, PathId};
use super::response::{self, ApiResponse, Results};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::order::{CreateOrderInput, Order, OrderSummary, UpdateOrderInput};
use crate::services::OrderService;
use crate::state::AppState;

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order/list", get(list))
        .route("/order/create", post(create))
        .route("/order/update/{id}", patch(update))
        .route("/order/delete/{id}", delete(remove))
        .route("/order/item/delete/{id}", delete(remove_item))
        .route("/order/{id}", get(show))
}

/// List orders, optionally for one customer.
#[instrument(skip_all)]
pub async fn list(
    auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<OrderSummary>>> {
    let page = OrderService::new(state.pool(), state.tokens())
        .list(&auth.token, &filter)
        .await?;
    Ok(response::results(page))
}

/// Fetch one order with its lines.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn show(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<OrderId>,
    Lang(language): Lang,
) -> Result<ApiResponse<Order>> {
    let order = OrderService::new(state.pool(), state.tokens())
        .get(&auth.token, id, language)
        .await?;
    Ok(response::data(order))
}

/// Place an order for the acting customer.
#[instrument(skip_all, fields(items = input.items.len()))]
pub async fn create(
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateOrderInput>,
) -> Result<ApiResponse<()>> {
    let id = OrderService::new(state.pool(), state.tokens())
        .create(&auth.token, input)
        .await?;
    Ok(response::created(StatusCode::CREATED, id))
}

/// Change an order's statuses or delivery date.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn update(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<OrderId>,
    JsonBody(input): JsonBody<UpdateOrderInput>,
) -> Result<ApiResponse<()>> {
    OrderService::new(state.pool(), state.tokens())
        .update(&auth.token, id, input)
        .await?;
    Ok(response::ok())
}

/// Soft-delete an order.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn remove(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<OrderId>,
) -> Result<ApiResponse<()>> {
    OrderService::new(state.pool(), state.tokens())
        .delete(&auth.token, id)
        .await?;
    Ok(response::ok())
}

/// Soft-delete one order line.
#[instrument(skip_all, fields(order_item_id = %id))]
pub async fn remove_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<OrderItemId>,
) -> Result<ApiResponse<()>> {
    OrderService::new(state.pool(), state.tokens())
        .delete_item(&auth.token, id)
        .await?;
    Ok(response::ok())
}
