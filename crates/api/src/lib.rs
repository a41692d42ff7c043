//! # ssogate API
//!
//! HTTP layer - routes, application context and the binary's wiring.
//!
//! This crate contains:
//! - axum routes for login, callback, logout and the landing page
//! - Application context (dependency injection)
//! - Cookie and logging helpers
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the ports of `ssogate-core` to the adapters of `ssogate-infra`

pub mod context;
pub mod routes;
pub mod utils;

// Re-export for convenience
pub use context::AppContext;
pub use routes::build_router;
