//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Client errors render as
//! `{"error": "<message>"}`; listing parameter errors keep the
//! `{"message": "<message>"}` shape the admin UI expects. Server errors are
//! captured to Sentry and reported without details.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use bozor_core::{FilterError, LocalizedTextError};

use crate::db::RepositoryError;
use crate::models::order::OrderInputError;
use crate::services::auth::AuthError;
use crate::services::files::FileError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Authentication failed.
    #[error("Auth error: {0}")]
    Auth(AuthError),

    /// Storing or removing an uploaded file failed.
    #[error("File error: {0}")]
    File(#[from] FileError),

    /// Listing query parameters did not parse.
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("not found".to_owned()),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Repository(inner) => inner.into(),
            AuthError::WeakPassword(message) => Self::BadRequest(message),
            other => Self::Auth(other),
        }
    }
}

impl From<LocalizedTextError> for AppError {
    fn from(err: LocalizedTextError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl From<OrderInputError> for AppError {
    fn from(err: OrderInputError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl AppError {
    /// Shorthand for a `BadRequest` with a message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::PasswordHash | AuthError::TokenGeneration(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::File(err) => match err {
                FileError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                FileError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Filter(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Message safe to show to clients.
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "invalid credentials".to_owned(),
                AuthError::MissingToken => "missing authorization token".to_owned(),
                AuthError::ExpiredToken => "token expired".to_owned(),
                AuthError::PasswordHash | AuthError::TokenGeneration(_) => {
                    "Internal server error".to_owned()
                }
                _ => "invalid token".to_owned(),
            },
            Self::File(FileError::Io(_)) => "Internal server error".to_owned(),
            Self::File(err) => err.to_string(),
            Self::Filter(err) => err.to_string(),
            Self::NotFound(message)
            | Self::Conflict(message)
            | Self::BadRequest(message) => message.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let message = self.client_message();
        let body = match self {
            Self::Filter(_) => json!({ "message": message }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the acting user's ID.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("category".to_string());
        assert_eq!(err.to_string(), "Not found: category");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(RepositoryError::Conflict("login already exists".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::MissingToken.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::ExpiredToken.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::WeakPassword("short".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(FilterError::InvalidLimit.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(FileError::UnsupportedFormat("exe".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderInputError::OrderStatusOutOfRange.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_filter_error_uses_message_key() {
        let (status, body) = body_json(FilterError::InvalidOffset.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Offset must be number!" }));
    }

    #[tokio::test]
    async fn test_client_errors_use_error_key() {
        let (_, body) = body_json(RepositoryError::NotFound.into()).await;
        assert_eq!(body, json!({ "error": "not found" }));

        let (_, body) = body_json(AppError::bad_request("invalid user id")).await;
        assert_eq!(body, json!({ "error": "invalid user id" }));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad json".to_string()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));

        let (_, body) = body_json(AuthError::InvalidToken("jwt detail".to_string()).into()).await;
        assert_eq!(body, json!({ "error": "invalid token" }));
    }
}
