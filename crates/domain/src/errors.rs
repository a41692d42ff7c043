//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ClaimKind;

/// Main error type for ssogate
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SsoGateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ssogate operations
pub type Result<T> = std::result::Result<T, SsoGateError>;

/// Failure of one step of the authorization-code login flow.
///
/// Variants never carry token material, authorization codes or secrets, so
/// they can be logged verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowError {
    /// Misconfiguration; fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// The callback's state nonce was never issued, already consumed, or
    /// expired. Treated as a possible CSRF or replay attempt.
    #[error("unknown, expired or already used state")]
    InvalidState,

    /// Network-level failure talking to the provider.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered the token request with a non-2xx status.
    #[error("token endpoint returned HTTP {status}{}", provider_error_code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    TokenEndpoint { status: u16, provider_error_code: Option<String> },

    /// A provider response could not be parsed.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The ID token is not a well-formed JWS.
    #[error("malformed ID token: {0}")]
    MalformedToken(String),

    /// No published key matches the token's key id, even after a refresh.
    #[error("unknown signing key{}", kid.as_deref().map(|k| format!(" '{k}'")).unwrap_or_default())]
    UnknownSigningKey { kid: Option<String> },

    /// The signature does not verify, or the algorithm is not allowed.
    #[error("ID token signature invalid: {0}")]
    SignatureInvalid(String),

    /// A claim failed verification.
    #[error("ID token claim '{which}' invalid")]
    ClaimInvalid { which: ClaimKind },

    /// The pending-request store or the session store rejected an operation.
    #[error("store error: {0}")]
    Session(String),
}

impl AuthFlowError {
    /// Only network-level failures may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Failures that must be recorded as security events.
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            Self::InvalidState
                | Self::UnknownSigningKey { .. }
                | Self::SignatureInvalid(_)
                | Self::ClaimInvalid { .. }
                | Self::MalformedToken(_)
        )
    }

    /// Stable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidState => "invalid_state",
            Self::Transport(_) => "transport",
            Self::TokenEndpoint { .. } => "token_endpoint",
            Self::MalformedResponse(_) => "malformed_response",
            Self::MalformedToken(_) => "malformed_token",
            Self::UnknownSigningKey { .. } => "unknown_signing_key",
            Self::SignatureInvalid(_) => "signature_invalid",
            Self::ClaimInvalid { .. } => "claim_invalid",
            Self::Session(_) => "session",
        }
    }
}

impl From<AuthFlowError> for SsoGateError {
    fn from(err: AuthFlowError) -> Self {
        match err {
            AuthFlowError::Config(msg) => SsoGateError::Config(msg),
            AuthFlowError::Transport(msg) => SsoGateError::Network(msg),
            AuthFlowError::Session(msg) => SsoGateError::Storage(msg),
            AuthFlowError::TokenEndpoint { .. } | AuthFlowError::MalformedResponse(_) => {
                SsoGateError::Auth(err.to_string())
            }
            other => SsoGateError::Security(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(AuthFlowError::Transport("timeout".into()).is_retryable());
        assert!(!AuthFlowError::InvalidState.is_retryable());
        assert!(!AuthFlowError::TokenEndpoint { status: 503, provider_error_code: None }
            .is_retryable());
        assert!(!AuthFlowError::SignatureInvalid("bad".into()).is_retryable());
    }

    #[test]
    fn validation_failures_are_security_events() {
        assert!(AuthFlowError::InvalidState.is_security_event());
        assert!(AuthFlowError::UnknownSigningKey { kid: Some("k".into()) }.is_security_event());
        assert!(AuthFlowError::ClaimInvalid { which: ClaimKind::Issuer }.is_security_event());
        assert!(!AuthFlowError::Transport("reset".into()).is_security_event());
        assert!(!AuthFlowError::Config("missing".into()).is_security_event());
    }

    #[test]
    fn display_names_the_offending_claim_and_provider_code() {
        let err = AuthFlowError::ClaimInvalid { which: ClaimKind::Audience };
        assert_eq!(err.to_string(), "ID token claim 'aud' invalid");

        let err = AuthFlowError::TokenEndpoint {
            status: 400,
            provider_error_code: Some("invalid_grant".into()),
        };
        assert_eq!(err.to_string(), "token endpoint returned HTTP 400 (invalid_grant)");

        let err = AuthFlowError::TokenEndpoint { status: 502, provider_error_code: None };
        assert_eq!(err.to_string(), "token endpoint returned HTTP 502");
    }

    #[test]
    fn converts_into_domain_error_categories() {
        assert_eq!(
            SsoGateError::from(AuthFlowError::Transport("dns".into())),
            SsoGateError::Network("dns".into())
        );
        assert!(matches!(
            SsoGateError::from(AuthFlowError::SignatureInvalid("x".into())),
            SsoGateError::Security(_)
        ));
    }
}
