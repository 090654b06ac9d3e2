//! User service.
//!
//! The bootstrap admin (id 1) cannot be fetched, changed or deleted here;
//! such requests fail with `invalid user id` before any query runs.

use sqlx::PgPool;
use tracing::{info, warn};

use bozor_core::{ListFilter, UserId};

use super::auth::{hash_password, validate_password};
use super::files::{FileStorage, MediaFolder, UploadedFile, discard_uploads};
use super::{TokenValidator, authorize};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::models::user::{CreateUserInput, UpdateUserInput, User, UserChanges};

/// User operations.
pub struct UserService<'a, S> {
    users: UserRepository<'a>,
    tokens: &'a dyn TokenValidator,
    storage: &'a S,
}

impl<'a, S: FileStorage> UserService<'a, S> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator, storage: &'a S) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
            storage,
        }
    }

    /// Create a user, hashing the password and storing the avatar.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for a
    /// blank name or weak password, `AppError::Conflict` for a taken login.
    pub async fn create(
        &self,
        token: &str,
        input: CreateUserInput,
        avatar: Option<&UploadedFile>,
    ) -> Result<UserId> {
        let actor = authorize(self.tokens, token)?;
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(AppError::bad_request("first_name and last_name are required"));
        }

        let password_hash = input.password.as_deref().map(new_password_hash).transpose()?;
        let avatar_path = self.store_avatar(avatar).await?;

        match self
            .users
            .create(&input, password_hash.as_deref(), avatar_path.as_deref(), actor.id)
            .await
        {
            Ok(id) => {
                info!(new_user_id = %id, role = %input.role, user_id = %actor.id, "User created");
                Ok(id)
            }
            Err(e) => {
                discard_uploads(self.storage, avatar_path.as_slice()).await;
                Err(e.into())
            }
        }
    }

    /// Write the present fields of `input`. A new avatar replaces the old
    /// one, whose file is deleted after the update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for the bootstrap admin or a weak
    /// password, `AppError::NotFound` if the user does not exist,
    /// `AppError::Conflict` for a taken login.
    pub async fn update(
        &self,
        token: &str,
        id: UserId,
        input: UpdateUserInput,
        avatar: Option<&UploadedFile>,
    ) -> Result<()> {
        ensure_manageable(id)?;
        let actor = authorize(self.tokens, token)?;

        let password_hash = input.password.as_deref().map(new_password_hash).transpose()?;
        let mut changes = UserChanges {
            input,
            password_hash,
            avatar: None,
        };
        if changes.is_empty() && avatar.is_none() {
            return Ok(());
        }

        let previous_avatar = match avatar {
            Some(_) => self
                .users
                .get_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound("not found".to_owned()))?
                .avatar,
            None => None,
        };
        changes.avatar = self.store_avatar(avatar).await?;

        if let Err(e) = self.users.update(id, &changes, actor.id).await {
            discard_uploads(self.storage, changes.avatar.as_slice()).await;
            return Err(e.into());
        }

        if changes.avatar.is_some()
            && let Some(old) = previous_avatar
            && let Err(e) = self.storage.delete(&old).await
        {
            warn!(target_user_id = %id, path = %old, error = %e, "Failed to delete replaced avatar");
        }

        info!(target_user_id = %id, user_id = %actor.id, "User updated");
        Ok(())
    }

    /// Soft-delete a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for the bootstrap admin,
    /// `AppError::NotFound` if the user does not exist.
    pub async fn delete(&self, token: &str, id: UserId) -> Result<()> {
        ensure_manageable(id)?;
        let actor = authorize(self.tokens, token)?;

        self.users.delete(id, actor.id).await?;
        info!(target_user_id = %id, user_id = %actor.id, "User deleted");
        Ok(())
    }

    /// A single user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for the bootstrap admin,
    /// `AppError::NotFound` if the user does not exist.
    pub async fn get(&self, id: UserId) -> Result<User> {
        ensure_manageable(id)?;
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("not found".to_owned()))
    }

    /// List users except the bootstrap admin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<User>> {
        Ok(self.users.list(filter).await?)
    }

    async fn store_avatar(&self, avatar: Option<&UploadedFile>) -> Result<Option<String>> {
        match avatar {
            Some(file) => Ok(Some(self.storage.upload(MediaFolder::Avatars, file).await?)),
            None => Ok(None),
        }
    }
}

fn ensure_manageable(id: UserId) -> Result<()> {
    if id.is_manageable() {
        Ok(())
    } else {
        Err(AppError::bad_request("invalid user id"))
    }
}

fn new_password_hash(password: &str) -> Result<String> {
    validate_password(password)?;
    Ok(hash_password(password)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::config::MediaConfig;
    use crate::services::files::LocalFileStorage;
    use crate::services::testing::FixedToken;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://bozor@localhost/bozor")
            .unwrap()
    }

    fn storage() -> LocalFileStorage {
        LocalFileStorage::new(&MediaConfig {
            dir: std::env::temp_dir().join("bozor-users-test"),
            max_upload_bytes: 1024,
        })
    }

    #[test]
    fn test_ensure_manageable() {
        assert!(ensure_manageable(UserId::new(2)).is_ok());
        assert!(ensure_manageable(UserId::new(1)).is_err());
        assert!(ensure_manageable(UserId::new(0)).is_err());
        assert!(ensure_manageable(UserId::new(-4)).is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_rejected_before_auth() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let storage = storage();
        let service = UserService::new(&pool, &tokens, &storage);

        let err = service.delete("no-token", UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(message) if message == "invalid user id"));

        let err = service.get(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_empty_update_is_a_no_op() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let storage = storage();
        let service = UserService::new(&pool, &tokens, &storage);

        service
            .update("good", UserId::new(5), UpdateUserInput::default(), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_weak_password_is_rejected() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let storage = storage();
        let service = UserService::new(&pool, &tokens, &storage);

        let input = UpdateUserInput {
            password: Some("short".to_owned()),
            ..UpdateUserInput::default()
        };
        let err = service
            .update("good", UserId::new(5), input, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
