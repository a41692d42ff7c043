//! Session binding
//!
//! Turns a validated login into an opaque session id backed by the session
//! store. Only the subject, a display name, the token set and the ID token
//! expiry are kept.

use std::sync::Arc;

use ssogate_common::auth::generate_session_id;
use ssogate_common::Clock;
use ssogate_domain::{
    AuthFlowError, Secret, SessionHandle, SessionRecord, TokenSet, ValidatedClaims,
};
use tracing::{debug, info};

use super::ports::SessionStore;

pub struct SessionBinder {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl SessionBinder {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a session for `claims.subject` lasting until the ID token
    /// expires.
    ///
    /// # Errors
    /// `AuthFlowError::Session` if the store rejects the record.
    pub async fn bind_session(
        &self,
        claims: &ValidatedClaims,
        token_set: TokenSet,
    ) -> Result<SessionHandle, AuthFlowError> {
        let session_id = generate_session_id();
        let record = SessionRecord {
            subject: claims.subject.clone(),
            display_name: claims.display_name().map(str::to_string),
            token_set,
            created_at: self.clock.now(),
            expires_at: claims.expiry,
        };

        self.store
            .create(&session_id, record)
            .await
            .map_err(|e| AuthFlowError::Session(e.to_string()))?;

        info!(subject = %claims.subject, expires_at = %claims.expiry, "Session bound");
        Ok(SessionHandle { session_id: Secret::new(session_id), expires_at: claims.expiry })
    }

    /// Live session for `session_id`. Expired records are deleted and
    /// reported as absent.
    ///
    /// # Errors
    /// `AuthFlowError::Session` if the store fails.
    pub async fn resolve(&self, session_id: &str) -> Result<Option<SessionRecord>, AuthFlowError> {
        let record = self
            .store
            .get(session_id)
            .await
            .map_err(|e| AuthFlowError::Session(e.to_string()))?;

        match record {
            Some(record) if record.is_expired(self.clock.now()) => {
                debug!(subject = %record.subject, "Session expired");
                self.logout(session_id).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Delete the session. Returns whether one existed.
    ///
    /// # Errors
    /// `AuthFlowError::Session` if the store fails.
    pub async fn logout(&self, session_id: &str) -> Result<bool, AuthFlowError> {
        self.store.delete(session_id).await.map_err(|e| AuthFlowError::Session(e.to_string()))
    }
}
