//! Database operations for the admin `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `users`, `roles`, `regions`, `districts` - Accounts and geography
//! - `categories`, `params`, `category_params`, `param_values` - Catalog taxonomy
//! - `products`, `product_param_values` - Catalog items and their attribute values
//! - `orders`, `order_items`, `order_statuses`, `payment_statuses` - Orders
//! - `carts`, `cart_items`, `wishlists`, `wishlist_items` - Per-customer containers
//!
//! Every table carries `created_*`, `updated_*` and `deleted_*` audit columns.
//! Deletes only stamp `deleted_at`/`deleted_by`; every read filters
//! `deleted_at IS NULL`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p bozor-cli -- migrate
//! ```

pub mod carts;
pub mod categories;
pub mod geo;
pub mod listing;
pub mod orders;
pub mod param_values;
pub mod params;
pub mod products;
pub mod roles;
pub mod statuses;
pub mod users;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bozor_core::UserId;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use geo::GeoRepository;
pub use orders::OrderRepository;
pub use param_values::ParamValueRepository;
pub use params::ParamRepository;
pub use products::ProductRepository;
pub use roles::RoleRepository;
pub use statuses::{StatusKind, StatusRepository};
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique login).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, anything else to `Database`.
    pub(crate) fn unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Soft-delete one live row of `table`.
///
/// `table` must be a trusted identifier, never client input.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no live row has this id.
pub(crate) async fn soft_delete<'e, E>(
    executor: E,
    table: &'static str,
    id: i64,
    actor: UserId,
) -> Result<(), RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE {table} SET deleted_at = NOW(), deleted_by = $1 \
         WHERE id = $2 AND deleted_at IS NULL"
    );

    let result = sqlx::query(&sql)
        .bind(actor)
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Count live rows of `table`.
///
/// Listing counts deliberately ignore search and narrowing filters, so
/// `count` is the size of the whole live table.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub(crate) async fn count_live(pool: &PgPool, table: &'static str) -> Result<i64, RepositoryError> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE deleted_at IS NULL");
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}
