//! Product route handlers.
//!
//! Create and update take a multipart body: a JSON `data` part and any
//! number of `images` parts.

use axum::{
    Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::instrument;

use bozor_core::ProductId;

use super::extract::{Listing, MultipartForm, PathId};
use super::response::{self, ApiResponse, Results};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::product::{CreateProductInput, Product, ProductSummary, UpdateProductInput};
use crate::services::ProductService;
use crate::state::AppState;

/// Multipart part name carrying product images.
const IMAGES_FIELD: &str = "images";

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/products", get(list))
        .route("/admin/product/create", post(create))
        .route("/admin/product/update/{id}", patch(update))
        .route("/admin/product/delete/{id}", delete(remove))
        .route("/admin/product/{id}", get(show))
}

/// Query parameters for fetching one product.
#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    /// Include seller fields.
    #[serde(default)]
    pub detail: bool,
}

/// List products.
#[instrument(skip_all)]
pub async fn list(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<ProductSummary>>> {
    let page = ProductService::new(state.pool(), state.tokens(), state.storage())
        .list(&filter)
        .await?;
    Ok(response::results(page))
}

/// Fetch one product.
#[instrument(skip_all, fields(product_id = %id, detail = query.detail))]
pub async fn show(
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
    Query(query): Query<ShowQuery>,
) -> Result<ApiResponse<Product>> {
    let product = ProductService::new(state.pool(), state.tokens(), state.storage())
        .get(id, query.detail)
        .await?;
    Ok(response::data(product))
}

/// Create a product with its images.
#[instrument(skip_all)]
pub async fn create(
    auth: RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<()>> {
    let (input, images) = MultipartForm::<CreateProductInput>::read(multipart, IMAGES_FIELD)
        .await?
        .require_data()?;

    let id = ProductService::new(state.pool(), state.tokens(), state.storage())
        .create(&auth.token, input, &images)
        .await?;
    Ok(response::created(StatusCode::CREATED, id))
}

/// Update a product, appending any new images.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
    multipart: Multipart,
) -> Result<ApiResponse<()>> {
    let form = MultipartForm::<UpdateProductInput>::read(multipart, IMAGES_FIELD).await?;
    let input = form.data.unwrap_or_default();

    ProductService::new(state.pool(), state.tokens(), state.storage())
        .update(&auth.token, id, input, &form.files)
        .await?;
    Ok(response::ok())
}

/// Soft-delete a product.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn remove(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
) -> Result<ApiResponse<()>> {
    ProductService::new(state.pool(), state.tokens(), state.storage())
        .delete(&auth.token, id)
        .await?;
    Ok(response::ok())
}
