//! HTTP middleware and extractors for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded into the span, echoed in the response)
//!
//! Authentication is an extractor ([`RequireAuth`]) rather than a layer, so
//! the sign-in route and health checks stay open.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
