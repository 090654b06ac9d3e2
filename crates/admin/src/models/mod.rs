//! Domain models for admin.
//!
//! Each entity module holds the shapes returned by the API (a localized
//! summary for listings, a full record for `get`) and the `Create*Input` /
//! `Update*Input` payloads accepted by services. Update inputs use `Option`
//! for "absent means unchanged" and [`bozor_core::Patch`] where a field can
//! also be cleared.

pub mod cart;
pub mod category;
pub mod lookup;
pub mod order;
pub mod param;
pub mod param_value;
pub mod product;
pub mod status;
pub mod user;
pub mod wishlist;

/// One page of a listing together with the total live row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows of the requested page.
    pub items: Vec<T>,
    /// Total live rows of the entity, ignoring search and narrowing filters.
    pub count: i64,
}

impl<T> Page<T> {
    /// Create a page.
    #[must_use]
    pub const fn new(items: Vec<T>, count: i64) -> Self {
        Self { items, count }
    }
}
