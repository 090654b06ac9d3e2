//! Signed access tokens.
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`) and role id (`role`).
//! The `Authorization` header is treated as an opaque token; a leading
//! `Bearer ` is tolerated and stripped.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use bozor_core::{RoleId, UserId};

use super::AuthError;
use crate::config::JwtConfig;

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Acting user.
    pub id: UserId,
    /// Role of the acting user at sign-in time.
    pub role: RoleId,
}

/// Validates raw tokens into an [`Actor`].
///
/// Services depend on this trait rather than on a concrete signer.
pub trait TokenValidator: Send + Sync {
    /// Validate a raw `Authorization` value.
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` if the token is missing, malformed, forged or
    /// expired.
    fn validate(&self, raw: &str) -> Result<Actor, AuthError>;
}

/// Claims stored in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: i64,
    iat: i64,
    exp: i64,
    iss: String,
}

/// Issues and validates access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Duration,
    issuer: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiration", &self.expiration)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration: Duration::minutes(config.expiration_minutes),
            issuer: config.issuer.clone(),
        }
    }

    /// Issue a token for `actor`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenGeneration` if signing fails.
    pub fn issue(&self, actor: Actor) -> Result<String, AuthError> {
        self.issue_at(actor, Utc::now())
    }

    fn issue_at(&self, actor: Actor, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: actor.id.to_string(),
            role: actor.role.as_i64(),
            iat: now.timestamp(),
            exp: (now + self.expiration).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

impl TokenValidator for TokenService {
    fn validate(&self, raw: &str) -> Result<Actor, AuthError> {
        let token = strip_bearer(raw);
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_owned()))?;

        Ok(Actor {
            id: UserId::new(id),
            role: RoleId::new(data.claims.role),
        })
    }
}

/// Strip an optional `Bearer` scheme and surrounding whitespace.
///
/// A bare `"Bearer"` yields an empty token; `"Bearerxyz"` is left intact.
#[must_use]
pub fn strip_bearer(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => raw,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: SecretString::from(secret),
            expiration_minutes: 60,
            issuer: "bozor-admin".to_owned(),
        })
    }

    const ACTOR: Actor = Actor {
        id: UserId::new(7),
        role: RoleId::new(2),
    };

    #[test]
    fn test_issue_and_validate() {
        let tokens = service("kV9#qL2$wX7!mB4@zR8&nT1*pF6^sD3%");
        let token = tokens.issue(ACTOR).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), ACTOR);
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        let tokens = service("kV9#qL2$wX7!mB4@zR8&nT1*pF6^sD3%");
        let token = tokens.issue(ACTOR).unwrap();
        assert_eq!(tokens.validate(&format!("Bearer {token}")).unwrap(), ACTOR);
    }

    #[test]
    fn test_empty_token_is_missing() {
        let tokens = service("kV9#qL2$wX7!mB4@zR8&nT1*pF6^sD3%");
        assert!(matches!(tokens.validate(""), Err(AuthError::MissingToken)));
        assert!(matches!(tokens.validate("Bearer "), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("  Bearer   abc  "), "abc");
        assert_eq!(strip_bearer("Bearer "), "");
        assert_eq!(strip_bearer("Bearer"), "");
        assert_eq!(strip_bearer("Bearerabc"), "Bearerabc");
        assert_eq!(strip_bearer("abc"), "abc");
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let tokens = service("kV9#qL2$wX7!mB4@zR8&nT1*pF6^sD3%");
        assert!(matches!(
            tokens.validate("not-a-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = service("kV9#qL2$wX7!mB4@zR8&nT1*pF6^sD3%");
        let verifier = service("Zt5!hN8@cQ1#vJ4$gM7%bW2^yK9&dP6*");
        let token = issuer.issue(ACTOR).unwrap();
        assert!(matches!(
            verifier.validate(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = service("kV9#qL2$wX7!mB4@zR8&nT1*pF6^sD3%");
        let token = tokens
            .issue_at(ACTOR, Utc::now() - Duration::days(2))
            .unwrap();
        assert!(matches!(tokens.validate(&token), Err(AuthError::ExpiredToken)));
    }
}
