//! Bozor Core - Shared types library.
//!
//! This crate provides common types used across all Bozor components:
//! - `admin` - The admin REST backend
//! - `cli` - Command-line tools for migrations and account bootstrap
//! - `integration-tests` - End-to-end tests against a running server
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, localized text, partial-update fields and list filters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
