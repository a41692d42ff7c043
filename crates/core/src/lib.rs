//! # ssogate Core
//!
//! Authorization-code flow logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the pending-request store, the session
//!   store and the provider HTTP channel
//! - The request builder, token exchanger, token validator with its JWKS
//!   cache, and session binder
//! - The `LoginFlow` orchestrator driving the flow state machine
//!
//! ## Architecture Principles
//! - Only depends on `ssogate-common` and `ssogate-domain`
//! - No HTTP client or storage engine
//! - All external collaborators via traits

pub mod flow;
pub mod oidc;
pub mod session;

/// Tracing target for security-relevant events.
pub const SECURITY_TARGET: &str = "ssogate::security";

pub use flow::{FlowPorts, FlowSettings, LoginFlow};
pub use oidc::ports::{AuthRequestStore, HttpReply, ProviderTransport};
pub use oidc::{JwksCache, RequestBuilder, TokenExchanger, TokenValidator};
pub use session::ports::SessionStore;
pub use session::SessionBinder;
