//! User route handlers.

use axum::{
    Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;

use bozor_core::UserId;

use super::extract::{Listing, MultipartForm, PathId};
use super::response::{self, ApiResponse};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::user::{CreateUserInput, UpdateUserInput, User};
use crate::services::UserService;
use crate::state::AppState;

/// Multipart part carrying the avatar image.
const AVATAR_FIELD: &str = "avatar";

/// Build the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/user/list", get(list))
        .route("/admin/user/create", post(create))
        .route("/admin/user/delete/{id}", delete(remove))
        .route("/admin/user/{id}", get(show).patch(update))
}

/// List users.
#[instrument(skip_all)]
pub async fn list(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Vec<User>>> {
    let page = UserService::new(state.pool(), state.tokens(), state.storage())
        .list(&filter)
        .await?;
    Ok(response::page(page))
}

/// Fetch one user.
#[instrument(skip_all, fields(target_user_id = %id))]
pub async fn show(
    _auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<UserId>,
) -> Result<ApiResponse<User>> {
    let user = UserService::new(state.pool(), state.tokens(), state.storage())
        .get(id)
        .await?;
    Ok(response::data(user))
}

/// Create a user from a `data` part and an optional avatar.
#[instrument(skip_all)]
pub async fn create(
    auth: RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<()>> {
    let (input, files) = MultipartForm::<CreateUserInput>::read(multipart, AVATAR_FIELD)
        .await?
        .require_data()?;

    let id = UserService::new(state.pool(), state.tokens(), state.storage())
        .create(&auth.token, input, files.first())
        .await?;
    Ok(response::created(StatusCode::OK, id))
}

/// Update a user. Both the `data` part and the avatar are optional.
#[instrument(skip_all, fields(target_user_id = %id))]
pub async fn update(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<UserId>,
    multipart: Multipart,
) -> Result<ApiResponse<()>> {
    let form = MultipartForm::<UpdateUserInput>::read(multipart, AVATAR_FIELD).await?;
    let input = form.data.unwrap_or_default();

    UserService::new(state.pool(), state.tokens(), state.storage())
        .update(&auth.token, id, input, form.files.first())
        .await?;
    Ok(response::ok())
}

/// Soft-delete a user.
#[instrument(skip_all, fields(target_user_id = %id))]
pub async fn remove(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathId(id): PathId<UserId>,
) -> Result<ApiResponse<()>> {
    UserService::new(state.pool(), state.tokens(), state.storage())
        .delete(&auth.token, id)
        .await?;
    Ok(response::ok())
}
