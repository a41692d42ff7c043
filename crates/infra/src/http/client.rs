use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{redirect, RequestBuilder};
use ssogate_core::{HttpReply, ProviderTransport};
use ssogate_domain::constants::{
    DEFAULT_HTTP_BASE_BACKOFF_MS, DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS,
};
use ssogate_domain::{AuthFlowError, HttpConfig, Secret, SsoGateError};
use tracing::debug;
use url::Url;

use crate::errors::InfraError;

const DEFAULT_USER_AGENT: &str = concat!("ssogate/", env!("CARGO_PKG_VERSION"));
const JSON: &str = "application/json";

/// Back-channel client for the identity provider.
///
/// Every call has a bounded timeout. Connect, timeout and request-level
/// failures are retried up to `attempts` times in total; HTTP statuses are
/// handed back untouched. Redirects are never followed.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    attempts: usize,
    backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from the `[http]` section.
    ///
    /// # Errors
    /// `SsoGateError::Config` if the TLS backend cannot be initialised.
    pub fn from_config(config: &HttpConfig) -> Result<Self, SsoGateError> {
        Self::builder()
            .timeout(config.timeout())
            .max_attempts(config.max_attempts)
            .base_backoff(config.base_backoff())
            .build()
    }

    /// Send `request`, retrying transient failures, and read the whole body.
    async fn execute(&self, request: RequestBuilder) -> Result<HttpReply, AuthFlowError> {
        let mut attempt = 1;
        let response = loop {
            let Some(pending) = request.try_clone() else {
                return Err(AuthFlowError::Transport("request body is not replayable".into()));
            };
            match pending.send().await {
                Ok(response) => break response,
                Err(err) if attempt < self.attempts && is_transient(&err) => {
                    let delay = self.backoff_delay(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "Provider call failed, retrying");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "Provider call failed");
                    return Err(InfraError::from(err).into());
                }
            }
        };

        let status = response.status().as_u16();
        debug!(attempt, status, url = %response.url(), "Provider replied");
        let body = response.bytes().await.map_err(|e| AuthFlowError::from(InfraError::from(e)))?;
        Ok(HttpReply::new(status, body.to_vec()))
    }

    /// Delay before retry `n` (1-based): `backoff * 2^(n-1)`, capped at 2^8.
    fn backoff_delay(&self, retry: usize) -> Duration {
        let exponent = retry.saturating_sub(1).min(8) as u32;
        self.backoff.saturating_mul(2u32.pow(exponent))
    }
}

#[async_trait]
impl ProviderTransport for HttpClient {
    async fn post_form(
        &self,
        url: &Url,
        form: &[(&'static str, Secret)],
    ) -> Result<HttpReply, AuthFlowError> {
        let fields: Vec<(&str, &str)> = form.iter().map(|(name, value)| (*name, value.expose())).collect();
        let request = self.inner.post(url.clone()).header(ACCEPT, JSON).form(&fields);
        self.execute(request).await
    }

    async fn get_json(&self, url: &Url) -> Result<HttpReply, AuthFlowError> {
        self.execute(self.inner.get(url.clone()).header(ACCEPT, JSON)).await
    }
}

/// Builder for [`HttpClient`]; defaults come from the `[http]` section defaults.
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    attempts: usize,
    backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_HTTP_BASE_BACKOFF_MS),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Total attempts, first one included. Zero is treated as one.
    pub fn max_attempts(self, attempts: usize) -> Self {
        Self { attempts: attempts.max(1), ..self }
    }

    pub fn base_backoff(self, backoff: Duration) -> Self {
        Self { backoff, ..self }
    }

    pub fn user_agent(self, agent: impl Into<String>) -> Self {
        Self { user_agent: Some(agent.into()), ..self }
    }

    pub fn build(self) -> Result<HttpClient, SsoGateError> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(redirect::Policy::none())
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .no_proxy()
            .build()
            .map_err(|err| SsoGateError::from(InfraError::from(err)))?;

        Ok(HttpClient { inner, attempts: self.attempts.max(1), backoff: self.backoff })
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
