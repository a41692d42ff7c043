//! Login flow orchestration
//!
//! `LoginFlow` wires the four components together and walks the
//! [`FlowState`] machine for each callback. A flow that fails at any step
//! ends in `Failed` and never produces a session.

use std::sync::Arc;

use chrono::Duration;
use ssogate_common::Clock;
use ssogate_domain::{
    nonce_prefix, AuthFlowError, AuthRequestState, Config, FlowState, ProviderConfig, Secret,
    SessionHandle,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::oidc::ports::{AuthRequestStore, ProviderTransport};
use crate::oidc::{JwksCache, RequestBuilder, TokenExchanger, TokenValidator};
use crate::session::ports::SessionStore;
use crate::session::SessionBinder;
use crate::SECURITY_TARGET;

/// External collaborators of the flow.
#[derive(Clone)]
pub struct FlowPorts {
    pub requests: Arc<dyn AuthRequestStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub transport: Arc<dyn ProviderTransport>,
    pub clock: Arc<dyn Clock>,
}

/// Tunables taken from the application configuration.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub redirect_uri: String,
    pub clock_skew: Duration,
    pub state_ttl: Duration,
    pub jwks_min_refresh: Duration,
}

impl FlowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            redirect_uri: config.provider.redirect_uri.clone(),
            clock_skew: config.security.clock_skew(),
            state_ttl: config.security.state_ttl(),
            jwks_min_refresh: config.security.jwks_min_refresh(),
        }
    }
}

pub struct LoginFlow {
    redirect_uri: String,
    request_builder: RequestBuilder,
    exchanger: TokenExchanger,
    validator: TokenValidator,
    binder: SessionBinder,
    jwks: Arc<JwksCache>,
}

impl LoginFlow {
    pub fn new(provider: Arc<ProviderConfig>, settings: FlowSettings, ports: FlowPorts) -> Self {
        let jwks = Arc::new(
            JwksCache::new(provider.jwks_uri.clone(), ports.transport.clone(), ports.clock.clone())
                .with_min_refresh_interval(settings.jwks_min_refresh),
        );

        Self {
            redirect_uri: settings.redirect_uri,
            request_builder: RequestBuilder::new(
                provider.clone(),
                ports.requests.clone(),
                ports.clock.clone(),
            ),
            exchanger: TokenExchanger::new(
                provider.clone(),
                ports.requests,
                ports.transport,
                ports.clock.clone(),
            )
            .with_state_ttl(settings.state_ttl),
            validator: TokenValidator::new(provider, jwks.clone(), ports.clock.clone())
                .with_clock_skew(settings.clock_skew),
            binder: SessionBinder::new(ports.sessions, ports.clock),
            jwks,
        }
    }

    /// `Idle -> PendingCallback`: build the provider redirect.
    ///
    /// # Errors
    /// `Config` or `Session` from the request builder.
    pub async fn begin(&self) -> Result<(Url, AuthRequestState), AuthFlowError> {
        let mut state = FlowState::Idle;
        match self.request_builder.build_authorization_request(&self.redirect_uri).await {
            Ok(created) => {
                advance(&mut state, FlowState::PendingCallback);
                Ok(created)
            }
            Err(err) => Err(fail(&mut state, err)),
        }
    }

    /// `PendingCallback -> Exchanged -> Validated -> Bound`: handle the
    /// provider callback.
    ///
    /// # Errors
    /// The first failing step's error; the flow is then `Failed`.
    pub async fn complete(
        &self,
        code: &Secret,
        state_nonce: &str,
    ) -> Result<SessionHandle, AuthFlowError> {
        let mut state = FlowState::PendingCallback;
        debug!(state = nonce_prefix(state_nonce), "Callback received");

        let token_set = match self.exchanger.exchange_code(code, state_nonce).await {
            Ok(tokens) => tokens,
            Err(err) => return Err(fail(&mut state, err)),
        };
        advance(&mut state, FlowState::Exchanged);

        let claims = match self.validator.validate_id_token(&token_set).await {
            Ok(claims) => claims,
            Err(err) => return Err(fail(&mut state, err)),
        };
        advance(&mut state, FlowState::Validated);

        let handle = match self.binder.bind_session(&claims, token_set).await {
            Ok(handle) => handle,
            Err(err) => return Err(fail(&mut state, err)),
        };
        advance(&mut state, FlowState::Bound);

        info!(subject = %claims.subject, "Login flow completed");
        Ok(handle)
    }

    pub fn binder(&self) -> &SessionBinder {
        &self.binder
    }

    pub fn exchanger(&self) -> &TokenExchanger {
        &self.exchanger
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    pub fn jwks(&self) -> &Arc<JwksCache> {
        &self.jwks
    }
}

fn advance(state: &mut FlowState, next: FlowState) {
    match state.transition(next) {
        Ok(next) => {
            debug!(from = state.name(), to = next.name(), "Login flow transition");
            *state = next;
        }
        // Transitions are driven by straight-line code above.
        Err(err) => warn!(error = %err, "Login flow transition rejected"),
    }
}

fn fail(state: &mut FlowState, err: AuthFlowError) -> AuthFlowError {
    let stage = state.name();
    if err.is_security_event() {
        warn!(
            target: SECURITY_TARGET,
            event = err.label(),
            stage,
            error = %err,
            "Login rejected"
        );
    } else {
        warn!(event = err.label(), stage, error = %err, "Login flow failed");
    }
    advance(state, FlowState::Failed { reason: err.clone() });
    err
}
