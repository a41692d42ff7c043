//! Token endpoint payloads and the tokens derived from them

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::{AuthFlowError, Secret};

/// Tokens obtained from one successful exchange or refresh. Never mutated; a
/// refresh yields a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    pub access_token: Secret,
    pub id_token: Secret,
    pub refresh_token: Option<Secret>,
    pub token_type: String,
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Successful token endpoint response body.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    /// Build a `TokenSet` with `expires_at` relative to `received_at`.
    ///
    /// With `previous`, an omitted ID token or refresh token is carried over
    /// from it (refresh grant). Without it the ID token is mandatory.
    pub fn into_token_set(
        self,
        received_at: DateTime<Utc>,
        previous: Option<&TokenSet>,
    ) -> Result<TokenSet, AuthFlowError> {
        if self.access_token.is_empty() {
            return Err(AuthFlowError::MalformedResponse("empty access_token".into()));
        }

        let id_token = match (self.id_token.filter(|t| !t.is_empty()), previous) {
            (Some(token), _) => Secret::new(token),
            (None, Some(prev)) => prev.id_token.clone(),
            (None, None) => {
                return Err(AuthFlowError::MalformedResponse("missing id_token".into()));
            }
        };

        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .map(Secret::new)
            .or_else(|| previous.and_then(|p| p.refresh_token.clone()));

        let expires_at = Duration::try_seconds(self.expires_in.unwrap_or(0).max(0))
            .and_then(|lifetime| received_at.checked_add_signed(lifetime))
            .ok_or_else(|| AuthFlowError::MalformedResponse("expires_in out of range".into()))?;

        Ok(TokenSet {
            access_token: Secret::new(self.access_token),
            id_token,
            refresh_token,
            token_type: self.token_type,
            scope: self.scope,
            expires_at,
        })
    }
}

/// RFC 6749 section 5.2 error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ProviderErrorBody {
    /// Provider error code from a raw body, if it is a well-formed error
    /// document.
    pub fn error_code(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ProviderErrorBody>(body).ok().map(|b| b.error)
    }
}
