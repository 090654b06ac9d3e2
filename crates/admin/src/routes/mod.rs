//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Liveness check
//! GET  /health/ready                         - Readiness check (database)
//!
//! # Everything below is under /api/v1 and needs a token except sign-in
//! POST /admin/auth/sign-in                   - Exchange login/password for a token
//!
//! GET  /admin/user/list                      - Users (without the bootstrap admin)
//! POST /admin/user/create                    - Create user (multipart: data, avatar)
//! GET  /admin/user/{id}                      - User detail
//! PATCH /admin/user/{id}                     - Update user (multipart: data, avatar)
//! DELETE /admin/user/delete/{id}             - Delete user
//!
//! GET  /admin/category/list                  - Categories
//! POST /admin/category/create                - Create category
//! GET  /admin/category/{id}                  - Category detail with params
//! POST /admin/category/{id}                  - Children of a category
//! PATCH /admin/category/{id}                 - Update category
//! DELETE /admin/category/delete/{id}         - Delete category
//!
//! /admin/param/...                           - Same shape as categories
//! /admin/param-value/...                     - Same shape, plus GET list/{param_id}
//! /admin/order-status/...                    - Same shape
//! /admin/payment-status/...                  - Same shape
//!
//! GET  /admin/products                       - Products
//! POST /admin/product/create                 - Create product (multipart: data, images)
//! GET  /admin/product/{id}                   - Product detail (?detail=true for seller)
//! PATCH /admin/product/update/{id}           - Update product (multipart: data, images)
//! DELETE /admin/product/delete/{id}          - Delete product
//!
//! GET  /order/list                           - Orders (?customer_id=)
//! POST /order/create                         - Place order
//! GET  /order/{id}                           - Order detail with lines
//! PATCH /order/update/{id}                   - Change statuses or delivery date
//! DELETE /order/delete/{id}                  - Delete order
//! DELETE /order/item/delete/{id}             - Delete order line
//!
//! GET  /cart/list                            - Cart items
//! POST /cart/create                          - Add product to cart
//! PATCH /cart/item/{id}/update               - Set or bump quantity
//! DELETE /cart/item/delete/{id}              - Remove cart item
//!
//! GET  /admin/wishlist                       - Wishlists of the caller
//! POST /admin/wishlist/create                - Add product to wishlist
//! DELETE /admin/wishlist/delete/{id}         - Remove wishlist item
//!
//! GET  /admin/role/list                      - Roles
//! GET  /admin/region/list                    - Regions
//! GET  /admin/district/list                  - Districts (?region_id=)
//! ```

pub mod auth;
pub mod carts;
pub mod categories;
pub mod extract;
pub mod lookups;
pub mod orders;
pub mod params;
pub mod products;
pub mod response;
pub mod statuses;
pub mod users;
pub mod wishlists;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::get,
};

use crate::state::AppState;

/// Body limit for routes that accept file uploads. Each file is also
/// checked against `MAX_UPLOAD_BYTES` when stored.
const MAX_MULTIPART_BYTES: usize = 64 * 1024 * 1024;

/// Prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Build the complete router: health checks plus the versioned API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest(API_PREFIX, api())
}

fn api() -> Router<AppState> {
    let uploads = Router::new()
        .merge(users::router())
        .merge(products::router())
        .layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES));

    Router::new()
        .merge(auth::router())
        .merge(uploads)
        .merge(categories::router())
        .merge(params::router())
        .merge(statuses::router())
        .merge(orders::router())
        .merge(carts::router())
        .merge(wishlists::router())
        .merge(lookups::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
