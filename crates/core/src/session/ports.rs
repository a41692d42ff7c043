use async_trait::async_trait;
use ssogate_domain::{Result, SessionRecord};

/// Session storage keyed by opaque session id.
///
/// Records are never updated in place: a session is created once and later
/// deleted.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a record under a new id.
    ///
    /// # Errors
    /// Fails if `session_id` is already present.
    async fn create(&self, session_id: &str, record: SessionRecord) -> Result<()>;

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Returns whether a record was removed.
    async fn delete(&self, session_id: &str) -> Result<bool>;
}
