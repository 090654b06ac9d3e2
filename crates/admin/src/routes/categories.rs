//! Category route handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;

use bozor_core::CategoryId;

use super::extract::{JsonBody, Lang, Listing, PathId};
use super::response::{self, ApiResponse, Results};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::category::{Category, CategorySummary, CreateCategoryInput, UpdateCategoryInput};
use crate::services::CategoryService;
use crate::state::AppState;

/// Build the category router.
///
/// `POST /admin/category/{id}` lists the children of a category.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/category/list", get(list))
        .route("/admin/category/create", post(create))
        .route("/admin/category/delete/{id}", delete(remove))
        .route(
            "/admin/category/{id}",
            get(show).post(list_by_parent).patch(update),
        )
}

/// List categories.
#[instrument(skip_all)]
pub async fn list(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<CategorySummary>>> {
    let page = CategoryService::new(state.pool(), state.tokens())
        .list(&filter)
        .await?;
    Ok(response::results(page))
}

/// List the children of a category.
#[instrument(skip_all, fields(category_id = %id))]
pub async fn list_by_parent(
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<CategoryId>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<CategorySummary>>> {
    let page = CategoryService::new(state.pool(), state.tokens())
        .list_by_parent(id, &filter)
        .await?;
    Ok(response::results(page))
}

/// Fetch one category with its params.
#[instrument(skip_all, fields(category_id = %id))]
pub async fn show(
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<CategoryId>,
    Lang(language): Lang,
) -> Result<ApiResponse<Category>> {
    let category = CategoryService::new(state.pool(), state.tokens())
        .get(id, language)
        .await?;
    Ok(response::data(category))
}

/// Create a category.
#[instrument(skip_all)]
pub async fn create(
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryInput>,
) -> Result<ApiResponse<()>> {
    let id = CategoryService::new(state.pool(), state.tokens())
        .create(&auth.token, input)
        .await?;
    Ok(response::created(StatusCode::OK, id))
}

/// Update a category.
#[instrument(skip_all, fields(category_id = %id))]
pub async fn update(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<CategoryId>,
    JsonBody(input): JsonBody<UpdateCategoryInput>,
) -> Result<ApiResponse<()>> {
    CategoryService::new(state.pool(), state.tokens())
        .update(&auth.token, id, input)
        .await?;
    Ok(response::ok())
}

/// Soft-delete a category.
#[instrument(skip_all, fields(category_id = %id))]
pub async fn remove(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<CategoryId>,
) -> Result<ApiResponse<()>> {
    CategoryService::new(state.pool(), state.tokens())
        .delete(&auth.token, id)
        .await?;
    Ok(response::ok())
}
