//! Bozor admin library.
//!
//! JSON API for managing a marketplace catalogue: users, categories,
//! params, products, orders, carts and wishlists, backed by `PostgreSQL`.
//! The crate is a library so the router can be exercised in tests; the
//! `bozor-admin` binary wires it to a listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
