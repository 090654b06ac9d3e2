//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the first (bootstrap) admin on an empty database
//! bozor-cli user create --login admin --password '...' \
//!     --first-name Admin --last-name Bozor --role 1
//! ```
//!
//! # Environment Variables
//!
//! - `BOZOR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use bozor_admin::services::auth::{AuthError, hash_password, validate_password};
use bozor_core::{RoleId, UserId};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password rejected or hashing failed.
    #[error("Password error: {0}")]
    Password(#[from] AuthError),

    /// The role does not exist.
    #[error("Unknown role: {0}")]
    UnknownRole(RoleId),

    /// A live user already has this login.
    #[error("User already exists with login: {0}")]
    UserExists(String),
}

/// Fields for a new user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub login: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub role: RoleId,
}

/// Create a user that can sign in.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if the password is weak, the role is unknown, the
/// login is taken or the database is unreachable.
pub async fn create(user: &NewUser<'_>) -> Result<UserId, UserError> {
    validate_password(user.password)?;
    let database_url = super::database_url().map_err(UserError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let role_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1 AND deleted_at IS NULL)",
    )
    .bind(user.role)
    .fetch_one(&pool)
    .await?;
    if !role_exists {
        return Err(UserError::UnknownRole(user.role));
    }

    let existing: Option<UserId> =
        sqlx::query_scalar("SELECT id FROM users WHERE login = $1 AND deleted_at IS NULL")
            .bind(user.login)
            .fetch_optional(&pool)
            .await?;
    if existing.is_some() {
        return Err(UserError::UserExists(user.login.to_owned()));
    }

    let hash = hash_password(user.password)?;

    let user_id: UserId = sqlx::query_scalar(
        r"
        INSERT INTO users (first_name, last_name, phone_number, password, login, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.phone_number)
    .bind(hash)
    .bind(user.login)
    .bind(user.role)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "User created successfully! ID: {}, Login: {}, Role: {}",
        user_id,
        user.login,
        user.role
    );
    if !user_id.is_manageable() {
        tracing::warn!("Note: this is the bootstrap admin; the API will not list or change it.");
    }

    Ok(user_id)
}
