//! Order status and payment status route handlers.
//!
//! Both tables share one set of handlers; the router binds each copy to its
//! [`StatusKind`] through closures.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;

use super::extract::{JsonBody, Listing, PathId};
use super::response::{self, ApiResponse};
use crate::db::StatusKind;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::status::{CreateStatusInput, StatusEntry, StatusSummary, UpdateStatusInput};
use crate::services::StatusService;
use crate::state::AppState;

/// Build the status routers for both tables.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(kind_router("/admin/order-status", StatusKind::Order))
        .merge(kind_router("/admin/payment-status", StatusKind::Payment))
}

fn kind_router(prefix: &str, kind: StatusKind) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{prefix}/list"),
            get(move |auth: RequireAuth, state: State<AppState>, listing: Listing| {
                list(kind, auth, state, listing)
            }),
        )
        .route(
            &format!("{prefix}/create"),
            post(
                move |auth: RequireAuth,
                      state: State<AppState>,
                      body: JsonBody<CreateStatusInput>| {
                    create(kind, auth, state, body)
                },
            ),
        )
        .route(
            &format!("{prefix}/delete/{{id}}"),
            delete(move |auth: RequireAuth, state: State<AppState>, id: PathId<i64>| {
                remove(kind, auth, state, id)
            }),
        )
        .route(
            &format!("{prefix}/{{id}}"),
            get(move |auth: RequireAuth, state: State<AppState>, id: PathId<i64>| {
                show(kind, auth, state, id)
            })
            .patch(
                move |auth: RequireAuth,
                      state: State<AppState>,
                      id: PathId<i64>,
                      body: JsonBody<UpdateStatusInput>| {
                    update(kind, auth, state, id, body)
                },
            ),
        )
}

/// List statuses.
#[instrument(skip_all, fields(kind = ?kind))]
pub async fn list(
    kind: StatusKind,
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Vec<StatusSummary>>> {
    let page = StatusService::new(state.pool(), kind, state.tokens())
        .list(&filter)
        .await?;
    Ok(response::page(page))
}

/// Fetch one status.
#[instrument(skip_all, fields(kind = ?kind))]
pub async fn show(
    kind: StatusKind,
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
) -> Result<ApiResponse<StatusEntry>> {
    let status = StatusService::new(state.pool(), kind, state.tokens())
        .get(id)
        .await?;
    Ok(response::data(status))
}

/// Create a status.
#[instrument(skip_all, fields(kind = ?kind))]
pub async fn create(
    kind: StatusKind,
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateStatusInput>,
) -> Result<ApiResponse<()>> {
    let id = StatusService::new(state.pool(), kind, state.tokens())
        .create(&auth.token, input)
        .await?;
    Ok(response::created(StatusCode::OK, id))
}

/// Update a status.
#[instrument(skip_all, fields(kind = ?kind))]
pub async fn update(
    kind: StatusKind,
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
    JsonBody(input): JsonBody<UpdateStatusInput>,
) -> Result<ApiResponse<()>> {
    StatusService::new(state.pool(), kind, state.tokens())
        .update(&auth.token, id, input)
        .await?;
    Ok(response::ok())
}

/// Soft-delete a status.
#[instrument(skip_all, fields(kind = ?kind))]
pub async fn remove(
    kind: StatusKind,
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
) -> Result<ApiResponse<()>> {
    StatusService::new(state.pool(), kind, state.tokens())
        .delete(&auth.token, id)
        .await?;
    Ok(response::ok())
}
