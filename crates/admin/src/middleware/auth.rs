//! Authentication extractor for admin API routes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::services::{Actor, TokenValidator};
use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// Rejects with a `401` JSON error when the `Authorization` header is
/// missing, malformed, forged or expired. The raw header value is kept so
/// handlers can pass it on to services.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(auth: RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}!", auth.actor.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth {
    /// The validated caller.
    pub actor: Actor,
    /// The `Authorization` header as sent.
    pub token: String,
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let actor = state.tokens().validate(&token)?;
        set_sentry_user(&actor.id);

        Ok(Self { actor, token })
    }
}
