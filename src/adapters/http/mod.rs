//! HTTP adapters - liveness endpoint and request routing.
//!
//! The relay only owns two routes. Everything else is handed to a fallback
//! service supplied by the caller (the binary serves prerendered pages and
//! static assets from a directory).

pub mod health;
pub mod routes;

pub use health::healthcheck;
pub use routes::{app_router, HEALTHCHECK_PATH};
