//! User account domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bozor_core::{DistrictId, RegionId, RoleId, UserId};

/// A user account. The password hash is never part of it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Avatar path under `/media`.
    pub avatar: Option<String>,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number.
    pub phone_number: String,
    /// Sign-in login.
    pub login: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Email address.
    pub email: Option<String>,
    /// Role.
    pub role: RoleId,
    /// Home region.
    pub region_id: Option<RegionId>,
    /// Home district.
    pub district_id: Option<DistrictId>,
    /// Whether the account may sign in.
    pub status: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// What sign-in needs to know about an account.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID.
    pub id: UserId,
    /// Role.
    pub role: RoleId,
    /// Argon2 PHC hash, if a password was ever set.
    pub password_hash: Option<String>,
}

/// Input for creating a user.
///
/// The avatar arrives as a separate multipart part.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number.
    pub phone_number: String,
    /// Plain-text password, hashed before it is stored.
    pub password: Option<String>,
    /// Sign-in login, unique among live users.
    pub login: Option<String>,
    /// Date of birth (`YYYY-MM-DD`).
    pub birth_date: Option<NaiveDate>,
    /// Email address.
    pub email: Option<String>,
    /// Role.
    pub role: RoleId,
    /// Home region.
    pub region_id: Option<RegionId>,
    /// Home district.
    pub district_id: Option<DistrictId>,
}

/// Input for updating a user. Only present fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Phone number.
    pub phone_number: Option<String>,
    /// New plain-text password.
    pub password: Option<String>,
    /// Sign-in login.
    pub login: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Email address.
    pub email: Option<String>,
    /// Role.
    pub role: Option<RoleId>,
    /// Home region.
    pub region_id: Option<RegionId>,
    /// Home district.
    pub district_id: Option<DistrictId>,
    /// Enable or disable sign-in.
    pub status: Option<bool>,
}

/// Column values a user update writes, after hashing and uploads.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// Fields taken from the request.
    pub input: UpdateUserInput,
    /// Hash of the new password, replacing `input.password`.
    pub password_hash: Option<String>,
    /// Path of a newly uploaded avatar.
    pub avatar: Option<String>,
}

impl UserChanges {
    /// Whether no column would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let input = &self.input;
        self.password_hash.is_none()
            && self.avatar.is_none()
            && input.first_name.is_none()
            && input.last_name.is_none()
            && input.phone_number.is_none()
            && input.login.is_none()
            && input.birth_date.is_none()
            && input.email.is_none()
            && input.role.is_none()
            && input.region_id.is_none()
            && input.district_id.is_none()
            && input.status.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_birth_date_parses_iso_date() {
        let input: CreateUserInput = serde_json::from_str(
            r#"{"first_name":"Aziz","last_name":"Karimov","phone_number":"+998901234567",
                "birth_date":"1995-04-12","role":2}"#,
        )
        .unwrap();
        assert_eq!(input.birth_date, NaiveDate::from_ymd_opt(1995, 4, 12));
        assert_eq!(input.role, RoleId::new(2));
    }

    #[test]
    fn test_birth_date_rejects_other_formats() {
        let result = serde_json::from_str::<UpdateUserInput>(r#"{"birth_date":"12.04.1995"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_changes_emptiness() {
        assert!(UserChanges::default().is_empty());

        let changes = UserChanges {
            avatar: Some("/media/avatar/a.png".to_owned()),
            ..UserChanges::default()
        };
        assert!(!changes.is_empty());

        let changes = UserChanges {
            input: UpdateUserInput {
                status: Some(false),
                ..UpdateUserInput::default()
            },
            ..UserChanges::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_plain_password_alone_is_not_a_change() {
        let changes = UserChanges {
            input: UpdateUserInput {
                password: Some("ignored-until-hashed".to_owned()),
                ..UpdateUserInput::default()
            },
            ..UserChanges::default()
        };
        assert!(changes.is_empty());
    }
}
