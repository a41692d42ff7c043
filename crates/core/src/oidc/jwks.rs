//! Provider signing key cache
//!
//! Keys are read under a shared lock. A miss takes the refresh gate, so
//! concurrent misses wait for one in-flight fetch instead of each fetching.
//! Successful fetches are spaced at least `min_refresh` apart; a miss inside
//! that window fails without contacting the provider. A failed fetch does not
//! open the window, so the next miss tries again.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use serde_json::Value;
use ssogate_common::Clock;
use ssogate_domain::constants::DEFAULT_JWKS_MIN_REFRESH_SECS;
use ssogate_domain::AuthFlowError;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use super::ports::ProviderTransport;

/// Verification key published by the provider.
#[derive(Clone)]
pub struct SigningKey {
    pub key: DecodingKey,
    /// The JWK's `alg`, when it names one.
    pub algorithm: Option<Algorithm>,
}

#[derive(Deserialize)]
struct JwksDocument {
    keys: Vec<Value>,
}

pub struct JwksCache {
    jwks_uri: Url,
    transport: Arc<dyn ProviderTransport>,
    clock: Arc<dyn Clock>,
    min_refresh: Duration,
    keys: RwLock<HashMap<String, SigningKey>>,
    /// Time of the last fetch attempt; held across the fetch.
    refresh_gate: Mutex<Option<DateTime<Utc>>>,
}

impl JwksCache {
    pub fn new(jwks_uri: Url, transport: Arc<dyn ProviderTransport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            jwks_uri,
            transport,
            clock,
            min_refresh: Duration::seconds(DEFAULT_JWKS_MIN_REFRESH_SECS as i64),
            keys: RwLock::new(HashMap::new()),
            refresh_gate: Mutex::new(None),
        }
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh = interval;
        self
    }

    /// Key for `kid`, refreshing once on a miss.
    ///
    /// A token without `kid` matches only when exactly one key is published.
    ///
    /// # Errors
    /// `UnknownSigningKey` if the key is still absent after a refresh or the
    /// refresh was suppressed; `Transport`/`MalformedResponse` if the fetch
    /// itself failed.
    pub async fn signing_key(&self, kid: Option<&str>) -> Result<SigningKey, AuthFlowError> {
        if let Some(key) = self.lookup(kid).await {
            return Ok(key);
        }

        let mut last_fetch = self.refresh_gate.lock().await;

        // Someone else refreshed while we waited for the gate.
        if let Some(key) = self.lookup(kid).await {
            return Ok(key);
        }

        let now = self.clock.now();
        if let Some(at) = *last_fetch {
            if now - at < self.min_refresh {
                debug!(kid = kid.unwrap_or("-"), "JWKS refresh suppressed by rate limit");
                return Err(unknown(kid));
            }
        }

        self.fetch().await?;
        *last_fetch = Some(now);
        drop(last_fetch);

        self.lookup(kid).await.ok_or_else(|| unknown(kid))
    }

    /// Fetch keys regardless of the rate limit, e.g. at startup.
    ///
    /// # Errors
    /// `Transport` or `MalformedResponse` when the fetch fails.
    pub async fn refresh(&self) -> Result<usize, AuthFlowError> {
        let mut last_fetch = self.refresh_gate.lock().await;
        let count = self.fetch().await?;
        *last_fetch = Some(self.clock.now());
        Ok(count)
    }

    /// Number of cached keys.
    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.read().await.is_empty()
    }

    async fn lookup(&self, kid: Option<&str>) -> Option<SigningKey> {
        let keys = self.keys.read().await;
        match kid {
            Some(kid) => keys.get(kid).cloned(),
            None if keys.len() == 1 => keys.values().next().cloned(),
            None => None,
        }
    }

    /// Replace the cached key set with the provider's current one.
    async fn fetch(&self) -> Result<usize, AuthFlowError> {
        let reply = self.transport.get_json(&self.jwks_uri).await?;
        if !reply.is_success() {
            return Err(AuthFlowError::Transport(format!(
                "JWKS endpoint returned HTTP {}",
                reply.status
            )));
        }

        let document: JwksDocument = reply.json()?;
        let published = document.keys.len();
        let fresh = parse_signing_keys(document.keys);

        let count = fresh.len();
        *self.keys.write().await = fresh;

        if count < published {
            debug!(skipped = published - count, "Ignored non-signing or unusable JWKS entries");
        }
        if count == 0 {
            warn!(uri = %self.jwks_uri, "JWKS contains no usable signing keys");
        } else {
            info!(keys = count, "JWKS refreshed");
        }
        Ok(count)
    }
}

fn unknown(kid: Option<&str>) -> AuthFlowError {
    AuthFlowError::UnknownSigningKey { kid: kid.map(str::to_string) }
}

/// Parse each entry separately so one unsupported key does not hide the
/// rest. Encryption keys and keys without a usable `kid` are skipped.
fn parse_signing_keys(entries: Vec<Value>) -> HashMap<String, SigningKey> {
    let mut keys = HashMap::new();
    for entry in entries {
        if entry.get("use").and_then(Value::as_str) == Some("enc") {
            continue;
        }
        let algorithm = entry.get("alg").and_then(Value::as_str).map(Algorithm::from_str);
        let algorithm = match algorithm {
            Some(Ok(alg)) => Some(alg),
            Some(Err(_)) => continue,
            None => None,
        };
        let Ok(jwk) = serde_json::from_value::<Jwk>(entry) else {
            continue;
        };
        let Some(kid) = jwk.common.key_id.clone() else {
            continue;
        };
        let Ok(key) = DecodingKey::from_jwk(&jwk) else {
            continue;
        };
        keys.insert(kid, SigningKey { key, algorithm });
    }
    keys
}
