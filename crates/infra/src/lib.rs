//! # ssogate Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The reqwest-based provider transport
//! - In-memory pending-request and session stores
//! - Configuration loading and provider discovery
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `ssogate-core`
//! - Contains all "impure" code (network, process environment, files)

pub mod config;
pub mod discovery;
pub mod errors;
pub mod http;
pub mod observability;
pub mod stores;

// Re-export commonly used items
pub use discovery::resolve_provider;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
pub use stores::{InMemorySessionStore, PendingRequestCache};
