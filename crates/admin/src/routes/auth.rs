//! Sign-in route.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::extract::JsonBody;
use crate::error::Result;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/auth/sign-in", post(sign_in))
}

/// Sign-in request body.
#[derive(Deserialize)]
pub struct SignInRequest {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Sign-in response body.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub message: &'static str,
    pub token: String,
}

/// Exchange login and password for an access token.
///
/// # Errors
///
/// Returns 401 for an unknown login or wrong password.
#[instrument(skip_all, fields(login = %body.login))]
pub async fn sign_in(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignInRequest>,
) -> Result<Json<SignInResponse>> {
    let token = AuthService::new(state.pool(), state.tokens())
        .sign_in(&body.login, &body.password)
        .await?;

    Ok(Json(SignInResponse {
        message: "ok!",
        token,
    }))
}
