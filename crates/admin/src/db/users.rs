//! User repository for database operations.
//!
//! The bootstrap admin (id 1) is never listed. Callers guard the other
//! operations with [`UserId::is_manageable`] before reaching the database.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use bozor_core::{DistrictId, ListFilter, RegionId, RoleId, UserId};

use super::listing::{OrderColumns, push_page, push_text_search};
use super::{RepositoryError, soft_delete};
use crate::models::Page;
use crate::models::user::{CreateUserInput, User, UserChanges, UserCredentials};

const ORDER: OrderColumns = OrderColumns::new(
    "u.id DESC",
    &[
        ("id", "u.id"),
        ("first_name", "u.first_name"),
        ("last_name", "u.last_name"),
        ("login", "u.login"),
        ("role", "u.role"),
        ("birth_date", "u.birth_date"),
        ("created_at", "u.created_at"),
    ],
);

const LOGIN_TAKEN: &str = "login already exists";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    avatar: Option<String>,
    first_name: String,
    last_name: String,
    phone_number: String,
    login: Option<String>,
    birth_date: Option<NaiveDate>,
    email: Option<String>,
    role: RoleId,
    region_id: Option<RegionId>,
    district_id: Option<DistrictId>,
    status: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            avatar: row.avatar,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            login: row.login,
            birth_date: row.birth_date,
            email: row.email,
            role: row.role,
            region_id: row.region_id,
            district_id: row.district_id,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    id: UserId,
    role: RoleId,
    password: Option<String>,
}

impl From<CredentialsRow> for UserCredentials {
    fn from(row: CredentialsRow) -> Self {
        Self {
            id: row.id,
            role: row.role,
            password_hash: row.password,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up sign-in data of a live, active account by login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_credentials(
        &self,
        login: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT id, role, password
            FROM users
            WHERE login = $1 AND deleted_at IS NULL AND status = TRUE
            ",
        )
        .bind(login)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the login is taken.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &CreateUserInput,
        password_hash: Option<&str>,
        avatar: Option<&str>,
        actor: UserId,
    ) -> Result<UserId, RepositoryError> {
        sqlx::query_scalar(
            r"
            INSERT INTO users (
                avatar, first_name, last_name, phone_number, password, login,
                birth_date, email, role, region_id, district_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(avatar)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone_number)
        .bind(password_hash)
        .bind(&input.login)
        .bind(input.birth_date)
        .bind(&input.email)
        .bind(input.role)
        .bind(input.region_id)
        .bind(input.district_id)
        .bind(actor)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, LOGIN_TAKEN))
    }

    /// Get a live user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, avatar, first_name, last_name, phone_number, login, birth_date,
                   email, role, region_id, district_id, status, created_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List users other than the bootstrap admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<User>, RepositoryError> {
        let rows = list_query(filter)
            .build_query_as::<UserRow>()
            .fetch_all(self.pool)
            .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND id <> $1",
        )
        .bind(UserId::BOOTSTRAP_ADMIN)
        .fetch_one(self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }

    /// Write the present fields of `changes`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live user has this id.
    /// Returns `RepositoryError::Conflict` if the new login is taken.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
        actor: UserId,
    ) -> Result<(), RepositoryError> {
        let result = update_query(id, changes, actor)
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::unique(e, LOGIN_TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Soft-delete a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live user has this id.
    pub async fn delete(&self, id: UserId, actor: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "users", id.as_i64(), actor).await
    }
}

fn list_query(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT u.id, u.avatar, u.first_name, u.last_name, u.phone_number, u.login, \
         u.birth_date, u.email, u.role, u.region_id, u.district_id, u.status, u.created_at \
         FROM users u WHERE u.deleted_at IS NULL AND u.id <> ",
    );
    qb.push_bind(UserId::BOOTSTRAP_ADMIN);

    if let Some(role) = filter.role {
        qb.push(" AND u.role = ").push_bind(role);
    }
    push_text_search(&mut qb, &["u.first_name", "u.last_name"], filter);
    push_page(&mut qb, &ORDER, filter);
    qb
}

/// Build `UPDATE users SET ...` from the present fields only.
fn update_query(id: UserId, changes: &UserChanges, actor: UserId) -> QueryBuilder<'static, Postgres> {
    let input = &changes.input;
    let mut qb = QueryBuilder::new("UPDATE users SET ");

    {
        let mut set = qb.separated(", ");

        if let Some(avatar) = &changes.avatar {
            set.push("avatar = ").push_bind_unseparated(avatar.clone());
        }
        if let Some(first_name) = &input.first_name {
            set.push("first_name = ").push_bind_unseparated(first_name.clone());
        }
        if let Some(last_name) = &input.last_name {
            set.push("last_name = ").push_bind_unseparated(last_name.clone());
        }
        if let Some(phone_number) = &input.phone_number {
            set.push("phone_number = ").push_bind_unseparated(phone_number.clone());
        }
        if let Some(hash) = &changes.password_hash {
            set.push("password = ").push_bind_unseparated(hash.clone());
        }
        if let Some(login) = &input.login {
            set.push("login = ").push_bind_unseparated(login.clone());
        }
        if let Some(birth_date) = input.birth_date {
            set.push("birth_date = ").push_bind_unseparated(birth_date);
        }
        if let Some(email) = &input.email {
            set.push("email = ").push_bind_unseparated(email.clone());
        }
        if let Some(role) = input.role {
            set.push("role = ").push_bind_unseparated(role);
        }
        if let Some(region_id) = input.region_id {
            set.push("region_id = ").push_bind_unseparated(region_id);
        }
        if let Some(district_id) = input.district_id {
            set.push("district_id = ").push_bind_unseparated(district_id);
        }
        if let Some(status) = input.status {
            set.push("status = ").push_bind_unseparated(status);
        }

        set.push("updated_at = NOW()");
        set.push("updated_by = ").push_bind_unseparated(actor);
    }

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND deleted_at IS NULL");
    qb
}
