//! Mock implementations of the core ports

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use ssogate_core::{AuthRequestStore, HttpReply, ProviderTransport, SessionStore};
use ssogate_domain::{
    AuthFlowError, AuthRequestState, Result as DomainResult, Secret, SessionRecord, SsoGateError,
};
use url::Url;

/// Pending requests in a mutex-guarded map; `take` is a single `remove`.
#[derive(Default)]
pub struct InMemoryAuthRequests {
    entries: Mutex<HashMap<String, AuthRequestState>>,
}

impl InMemoryAuthRequests {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn contains(&self, nonce: &str) -> bool {
        self.entries.lock().unwrap().contains_key(nonce)
    }
}

#[async_trait]
impl AuthRequestStore for InMemoryAuthRequests {
    async fn insert(&self, state: AuthRequestState) -> DomainResult<()> {
        self.entries.lock().unwrap().insert(state.state_nonce.clone(), state);
        Ok(())
    }

    async fn take(&self, state_nonce: &str) -> DomainResult<Option<AuthRequestState>> {
        Ok(self.entries.lock().unwrap().remove(state_nonce))
    }

    async fn purge_expired(&self) -> DomainResult<usize> {
        Ok(0)
    }
}

#[derive(Default)]
pub struct InMemorySessions {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl InMemorySessions {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn create(&self, session_id: &str, record: SessionRecord) -> DomainResult<()> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(session_id) {
            return Err(SsoGateError::Storage("session id already exists".into()));
        }
        records.insert(session_id.to_string(), record);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> DomainResult<Option<SessionRecord>> {
        Ok(self.records.lock().unwrap().get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> DomainResult<bool> {
        Ok(self.records.lock().unwrap().remove(session_id).is_some())
    }
}

/// One recorded token endpoint call, with form values exposed for asserts.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub url: Url,
    pub form: Vec<(String, String)>,
}

impl RecordedPost {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Scripted provider: token replies are served in order; the JWKS document
/// can be swapped at any time.
#[derive(Default)]
pub struct MockProvider {
    token_replies: Mutex<VecDeque<Result<HttpReply, AuthFlowError>>>,
    jwks: Mutex<Option<Value>>,
    jwks_delay: Mutex<Option<Duration>>,
    posts: Mutex<Vec<RecordedPost>>,
    jwks_fetches: AtomicUsize,
}

impl MockProvider {
    pub fn with_jwks(self, jwks: Value) -> Self {
        self.set_jwks(jwks);
        self
    }

    pub fn set_jwks(&self, jwks: Value) {
        *self.jwks.lock().unwrap() = Some(jwks);
    }

    /// Hold each JWKS fetch open so concurrent misses overlap.
    pub fn with_jwks_delay(self, delay: Duration) -> Self {
        *self.jwks_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn push_token_json(&self, status: u16, body: Value) {
        self.push_token_reply(Ok(HttpReply::new(status, body.to_string())));
    }

    pub fn push_token_reply(&self, reply: Result<HttpReply, AuthFlowError>) {
        self.token_replies.lock().unwrap().push_back(reply);
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn jwks_fetches(&self) -> usize {
        self.jwks_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderTransport for MockProvider {
    async fn post_form(
        &self,
        url: &Url,
        form: &[(&'static str, Secret)],
    ) -> Result<HttpReply, AuthFlowError> {
        self.posts.lock().unwrap().push(RecordedPost {
            url: url.clone(),
            form: form.iter().map(|(k, v)| (k.to_string(), v.expose().to_string())).collect(),
        });
        self.token_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpReply::new(500, "no scripted reply")))
    }

    async fn get_json(&self, _url: &Url) -> Result<HttpReply, AuthFlowError> {
        self.jwks_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.jwks_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let body = self.jwks.lock().unwrap().clone();
        match body {
            Some(jwks) => Ok(HttpReply::new(200, jwks.to_string())),
            None => Ok(HttpReply::new(404, "")),
        }
    }
}
