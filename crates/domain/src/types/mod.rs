//! Domain types and models

pub mod auth_request;
pub mod claims;
pub mod flow;
pub mod provider;
pub mod session;
pub mod tokens;

pub use auth_request::{nonce_prefix, AuthRequestState};
pub use claims::{ClaimKind, ValidatedClaims};
pub use flow::{FlowState, InvalidTransition};
pub use provider::{DiscoveryDocument, ProviderConfig};
pub use session::{SessionHandle, SessionRecord};
pub use tokens::{ProviderErrorBody, TokenResponse, TokenSet};
