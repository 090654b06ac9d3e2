//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown login, inactive account or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No token was supplied.
    #[error("missing authorization token")]
    MissingToken,

    /// The token failed signature, issuer or shape validation.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token is past its expiry.
    #[error("token expired")]
    ExpiredToken,

    /// The password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token signing failed.
    #[error("token generation failed: {0}")]
    TokenGeneration(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
