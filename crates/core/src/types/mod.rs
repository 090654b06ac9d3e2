//! Core types for Bozor.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod filter;
pub mod id;
pub mod locale;
pub mod patch;

pub use filter::{
    FilterError, ListFilter, SortDirection, SortOrder, parse_id, parse_limit, parse_offset,
};
pub use id::*;
pub use locale::{Language, LocalizedText, LocalizedTextError};
pub use patch::Patch;
