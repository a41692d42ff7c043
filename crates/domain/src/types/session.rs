use chrono::{DateTime, Utc};

use crate::{Secret, TokenSet};

/// Returned to the caller after binding; the id becomes the session cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
    pub session_id: Secret,
    pub expires_at: DateTime<Utc>,
}

/// What the session store keeps per session id.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub subject: String,
    pub display_name: Option<String>,
    pub token_set: TokenSet,
    pub created_at: DateTime<Utc>,
    /// The ID token's expiry.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds left, never negative.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}
