//! Business logic services for admin.
//!
//! Route handlers stay thin: they parse the request and call one service
//! method. Every mutating method (and the few gated reads) receives the raw
//! `Authorization` value and validates it through [`TokenValidator`] before
//! touching the database.
//!
//! # Services
//!
//! - `auth` - Login/password sign-in and access tokens
//! - `categories` - Category tree
//! - `params` - Params and their values
//! - `statuses` - Order and payment status lookup tables
//! - `products` - Products with uploaded images
//! - `orders` - Orders and their line items
//! - `carts` / `wishlists` - Per-customer containers
//! - `users` - Accounts with avatars
//! - `lookups` - Cached roles, regions and districts
//! - `files` - Uploaded file storage

pub mod auth;
pub mod carts;
pub mod categories;
pub mod files;
pub mod lookups;
pub mod orders;
pub mod params;
pub mod products;
pub mod statuses;
pub mod users;
pub mod wishlists;

pub use auth::{Actor, AuthError, AuthService, TokenService, TokenValidator};
pub use carts::CartService;
pub use categories::CategoryService;
pub use files::{FileError, FileStorage, LocalFileStorage, MediaFolder, UploadedFile};
pub use lookups::{LookupCache, LookupService};
pub use orders::OrderService;
pub use params::{ParamService, ParamValueService};
pub use products::ProductService;
pub use statuses::StatusService;
pub use users::UserService;
pub use wishlists::WishlistService;

use crate::error::{self, set_sentry_user};

/// Validate `token` and tag the Sentry scope with the acting user.
fn authorize(tokens: &dyn TokenValidator, token: &str) -> error::Result<Actor> {
    let actor = tokens.validate(token)?;
    set_sentry_user(&actor.id);
    Ok(actor)
}
