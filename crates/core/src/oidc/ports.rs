//! Port interfaces for the login flow
//!
//! These traits define the boundaries between the flow logic and the
//! infrastructure that stores pending requests and talks to the provider.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use ssogate_domain::{AuthFlowError, AuthRequestState, Result, Secret};
use url::Url;

/// Pending authorization requests keyed by state nonce.
#[async_trait]
pub trait AuthRequestStore: Send + Sync {
    /// Store a new pending request.
    async fn insert(&self, state: AuthRequestState) -> Result<()>;

    /// Remove and return the request for `state_nonce` as one atomic step.
    ///
    /// Of two concurrent calls with the same nonce at most one gets `Some`.
    async fn take(&self, state_nonce: &str) -> Result<Option<AuthRequestState>>;

    /// Drop expired entries, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize>;
}

/// Status and body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    /// `AuthFlowError::MalformedResponse` when the body does not parse.
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, AuthFlowError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| AuthFlowError::MalformedResponse(e.to_string()))
    }
}

/// Back-channel HTTP to the identity provider.
///
/// Implementations apply a bounded timeout to every call, never follow
/// redirects, never store cookies, and retry only network-level failures.
/// HTTP error statuses come back as `Ok(HttpReply)`.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// POST an `application/x-www-form-urlencoded` body.
    async fn post_form(
        &self,
        url: &Url,
        form: &[(&'static str, Secret)],
    ) -> std::result::Result<HttpReply, AuthFlowError>;

    /// GET a JSON document.
    async fn get_json(&self, url: &Url) -> std::result::Result<HttpReply, AuthFlowError>;
}
