//! Authentication service.
//!
//! Login/password sign-in against Argon2id hashes, issuing signed access
//! tokens. Every other operation authenticates by validating such a token.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{hash_password, validate_password, verify_password};
pub use token::{Actor, TokenService, TokenValidator, strip_bearer};

use sqlx::PgPool;

use crate::db::UserRepository;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Sign in with login and password, returning an access token.
    ///
    /// Only live, active accounts can sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the login is unknown or the
    /// password does not match.
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<String, AuthError> {
        let Some(credentials) = self.users.find_credentials(login.trim()).await? else {
            tracing::info!("Sign-in rejected: unknown login");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(hash) = credentials.password_hash.as_deref() else {
            tracing::info!(user_id = %credentials.id, "Sign-in rejected: no password set");
            return Err(AuthError::InvalidCredentials);
        };
        verify_password(password, hash)?;

        let token = self.tokens.issue(Actor {
            id: credentials.id,
            role: credentials.role,
        })?;

        tracing::info!(user_id = %credentials.id, "User signed in");
        Ok(token)
    }
}
