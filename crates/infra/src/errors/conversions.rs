//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use ssogate_domain::{AuthFlowError, SsoGateError};

/// Domain error produced on the infrastructure side.
///
/// `reqwest` errors convert into it here, where the orphan rule allows it.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(#[from] pub SsoGateError);

impl From<InfraError> for SsoGateError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

/// Everything infra reports to the login flow is a transport failure: HTTP
/// statuses never become errors at this layer.
impl From<InfraError> for AuthFlowError {
    fn from(value: InfraError) -> Self {
        match value.0 {
            SsoGateError::Network(message) => AuthFlowError::Transport(message),
            other => AuthFlowError::Transport(other.to_string()),
        }
    }
}

trait IntoSsoGateError {
    fn into_ssogate(self) -> SsoGateError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SsoGateError */
/* -------------------------------------------------------------------------- */

impl IntoSsoGateError for HttpError {
    fn into_ssogate(self) -> SsoGateError {
        if self.is_builder() {
            return SsoGateError::Config(format!("invalid HTTP client setup: {self}"));
        }

        if self.is_timeout() {
            return SsoGateError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SsoGateError::Network("HTTP connection failure".into());
        }

        if self.is_redirect() {
            return SsoGateError::Network("provider answered with a redirect".into());
        }

        if self.is_body() || self.is_decode() {
            return SsoGateError::Network(format!("HTTP body could not be read: {self}"));
        }

        SsoGateError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_ssogate())
    }
}
