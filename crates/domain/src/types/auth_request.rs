use chrono::{DateTime, Duration, Utc};

use crate::Secret;

/// One pending login attempt, keyed by its state nonce until the callback
/// consumes it.
#[derive(Debug, Clone)]
pub struct AuthRequestState {
    pub state_nonce: String,
    /// Present for public clients only.
    pub code_verifier: Option<Secret>,
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
}

impl AuthRequestState {
    /// An entry exactly `ttl` old is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }

    /// First characters of the nonce, for correlating log lines.
    pub fn nonce_prefix(&self) -> &str {
        nonce_prefix(&self.state_nonce)
    }
}

/// Log-safe prefix of a state nonce.
pub fn nonce_prefix(nonce: &str) -> &str {
    let end = nonce.char_indices().nth(8).map(|(i, _)| i).unwrap_or(nonce.len());
    &nonce[..end]
}
