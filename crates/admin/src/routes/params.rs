//! Param and param value route handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;

use bozor_core::{ParamId, ParamValueId};

use super::extract::{JsonBody, Listing, PathId};
use super::response::{self, ApiResponse, Results};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::param::{CreateParamInput, Param, ParamSummary, UpdateParamInput};
use crate::models::param_value::{
    CreateParamValueInput, ParamValue, ParamValueSummary, UpdateParamValueInput,
};
use crate::services::{ParamService, ParamValueService};
use crate::state::AppState;

/// Build the param and param value router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/param/list", get(list))
        .route("/admin/param/create", post(create))
        .route("/admin/param/delete/{id}", delete(remove))
        .route("/admin/param/{id}", get(show).patch(update))
        .route("/admin/param-value/list", get(list_values))
        .route("/admin/param-value/list/{id}", get(list_values_by_param))
        .route("/admin/param-value/create", post(create_value))
        .route("/admin/param-value/delete/{id}", delete(remove_value))
        .route("/admin/param-value/{id}", get(show_value).patch(update_value))
}

// =============================================================================
// Params
// =============================================================================

/// List params.
#[instrument(skip_all)]
pub async fn list(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<ParamSummary>>> {
    let page = ParamService::new(state.pool(), state.tokens())
        .list(&filter)
        .await?;
    Ok(response::results(page))
}

/// Fetch one param with its categories.
#[instrument(skip_all, fields(param_id = %id))]
pub async fn show(
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ParamId>,
) -> Result<ApiResponse<Param>> {
    let param = ParamService::new(state.pool(), state.tokens()).get(id).await?;
    Ok(response::data(param))
}

/// Create a param.
#[instrument(skip_all)]
pub async fn create(
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateParamInput>,
) -> Result<ApiResponse<()>> {
    let id = ParamService::new(state.pool(), state.tokens())
        .create(&auth.token, input)
        .await?;
    Ok(response::created(StatusCode::CREATED, id))
}

/// Update a param.
#[instrument(skip_all, fields(param_id = %id))]
pub async fn update(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ParamId>,
    JsonBody(input): JsonBody<UpdateParamInput>,
) -> Result<ApiResponse<()>> {
    ParamService::new(state.pool(), state.tokens())
        .update(&auth.token, id, input)
        .await?;
    Ok(response::ok())
}

/// Soft-delete a param and its category links.
#[instrument(skip_all, fields(param_id = %id))]
pub async fn remove(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ParamId>,
) -> Result<ApiResponse<()>> {
    ParamService::new(state.pool(), state.tokens())
        .delete(&auth.token, id)
        .await?;
    Ok(response::ok())
}

// =============================================================================
// Param values
// =============================================================================

/// List param values.
#[instrument(skip_all)]
pub async fn list_values(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<ParamValueSummary>>> {
    let page = ParamValueService::new(state.pool(), state.tokens())
        .list(&filter)
        .await?;
    Ok(response::results(page))
}

/// List the values of one param.
#[instrument(skip_all, fields(param_id = %id))]
pub async fn list_values_by_param(
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ParamId>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<ParamValueSummary>>> {
    let page = ParamValueService::new(state.pool(), state.tokens())
        .list_by_param(id, &filter)
        .await?;
    Ok(response::results(page))
}

/// Fetch one param value.
#[instrument(skip_all, fields(param_value_id = %id))]
pub async fn show_value(
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ParamValueId>,
) -> Result<ApiResponse<ParamValue>> {
    let value = ParamValueService::new(state.pool(), state.tokens())
        .get(id)
        .await?;
    Ok(response::data(value))
}

/// Create a param value.
#[instrument(skip_all)]
pub async fn create_value(
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateParamValueInput>,
) -> Result<ApiResponse<()>> {
    let id = ParamValueService::new(state.pool(), state.tokens())
        .create(&auth.token, input)
        .await?;
    Ok(response::created(StatusCode::CREATED, id))
}

/// Update a param value.
#[instrument(skip_all, fields(param_value_id = %id))]
pub async fn update_value(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ParamValueId>,
    JsonBody(input): JsonBody<UpdateParamValueInput>,
) -> Result<ApiResponse<()>> {
    ParamValueService::new(state.pool(), state.tokens())
        .update(&auth.token, id, input)
        .await?;
    Ok(response::ok())
}

/// Soft-delete a param value.
#[instrument(skip_all, fields(param_value_id = %id))]
pub async fn remove_value(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<ParamValueId>,
) -> Result<ApiResponse<()>> {
    ParamValueService::new(state.pool(), state.tokens())
        .delete(&auth.token, id)
        .await?;
    Ok(response::ok())
}
