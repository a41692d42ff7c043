//! Pending authorization requests with moka
//!
//! Entries live at most the state TTL and the cache is bounded by
//! `security.max_pending_requests`. Expiry is also checked against the
//! injected [`Clock`] so a mock clock drives it in tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use moka::future::Cache;
use ssogate_common::Clock;
use ssogate_core::AuthRequestStore;
use ssogate_domain::{AuthRequestState, Result, SecurityConfig, SsoGateError};

pub struct PendingRequestCache {
    entries: Cache<String, AuthRequestState>,
    ttl: Duration,
    max_capacity: u64,
    clock: Arc<dyn Clock>,
}

impl PendingRequestCache {
    pub fn new(ttl: Duration, max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder()
            .time_to_live(ttl.to_std().unwrap_or_default())
            .max_capacity(max_capacity)
            .build();

        tracing::debug!(
            ttl_seconds = ttl.num_seconds(),
            max_capacity,
            "Pending request cache configured"
        );

        Self { entries, ttl, max_capacity, clock }
    }

    pub fn from_config(config: &SecurityConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.state_ttl(), config.max_pending_requests, clock)
    }

    /// Approximate number of stored entries.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuthRequestStore for PendingRequestCache {
    async fn insert(&self, state: AuthRequestState) -> Result<()> {
        self.entries.run_pending_tasks().await;
        if self.entries.entry_count() >= self.max_capacity {
            self.purge_expired().await?;
            if self.entries.entry_count() >= self.max_capacity {
                tracing::warn!(max_capacity = self.max_capacity, "Pending request store is full");
                return Err(SsoGateError::Storage("too many pending login requests".into()));
            }
        }

        self.entries.insert(state.state_nonce.clone(), state).await;
        Ok(())
    }

    async fn take(&self, state_nonce: &str) -> Result<Option<AuthRequestState>> {
        // `remove` is the single atomic step: concurrent callers race for it.
        let Some(entry) = self.entries.remove(state_nonce).await else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now(), self.ttl) {
            tracing::debug!(state = entry.nonce_prefix(), "Pending request expired");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let expired: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl))
            .map(|(key, _)| key)
            .collect();

        for key in &expired {
            self.entries.invalidate(key.as_str()).await;
        }
        self.entries.run_pending_tasks().await;

        if !expired.is_empty() {
            tracing::debug!(removed = expired.len(), "Purged expired pending requests");
        }
        Ok(expired.len())
    }
}
