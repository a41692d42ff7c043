//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use ssogate_common::{Clock, SystemClock};
use ssogate_core::{AuthRequestStore, FlowPorts, FlowSettings, LoginFlow, ProviderTransport};
use ssogate_domain::{Config, ProviderConfig, Result};
use ssogate_infra::{resolve_provider, HttpClient, InMemorySessionStore, PendingRequestCache};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::utils::logging::error_label;

/// Application context - holds the login flow and its stores
pub struct AppContext {
    pub config: Config,
    pub provider: Arc<ProviderConfig>,
    pub flow: Arc<LoginFlow>,
    pub requests: Arc<PendingRequestCache>,
    pub sessions: Arc<InMemorySessionStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Build the production context: reqwest transport, provider resolution
    /// (static or discovered) and in-memory stores.
    ///
    /// # Errors
    /// `Config` for invalid settings or a failed discovery.
    pub async fn new(config: Config) -> Result<Self> {
        let transport: Arc<dyn ProviderTransport> = Arc::new(HttpClient::from_config(&config.http)?);
        let provider = resolve_provider(&config.provider, transport.as_ref()).await?;
        Ok(Self::from_parts(config, provider, transport, Arc::new(SystemClock)))
    }

    /// Wire a context from already-resolved parts.
    pub fn from_parts(
        config: Config,
        provider: ProviderConfig,
        transport: Arc<dyn ProviderTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let provider = Arc::new(provider);
        let requests = Arc::new(PendingRequestCache::from_config(&config.security, clock.clone()));
        let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));

        let flow = Arc::new(LoginFlow::new(
            provider.clone(),
            FlowSettings::from_config(&config),
            FlowPorts {
                requests: requests.clone(),
                sessions: sessions.clone(),
                transport,
                clock: clock.clone(),
            },
        ));

        info!(
            issuer = %provider.issuer,
            client_id = %provider.client_id,
            public_client = provider.is_public_client(),
            "Application context initialised"
        );

        Self { config, provider, flow, requests, sessions, clock }
    }

    /// Fetch the provider's signing keys ahead of the first login. Failure
    /// is logged; keys are fetched again on the first callback.
    pub async fn warm_up(&self) {
        match self.flow.jwks().refresh().await {
            Ok(keys) => info!(keys, "Signing keys loaded"),
            Err(err) => warn!(error = %err, event = err.label(), "Signing key warm-up failed"),
        }
    }

    /// Periodically drop expired pending requests and sessions.
    pub fn spawn_housekeeping(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let context = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                context.purge_expired().await;
            }
        })
    }

    /// One housekeeping pass.
    pub async fn purge_expired(&self) {
        match self.requests.purge_expired().await {
            Ok(removed) => debug!(removed, "Pending request purge finished"),
            Err(err) => warn!(error = %err, event = error_label(&err), "Pending request purge failed"),
        }
        let sessions = self.sessions.purge_expired();
        if sessions > 0 {
            debug!(removed = sessions, "Expired sessions dropped");
        }
    }
}
