//! Code-for-token exchange and refresh against the provider's token endpoint

use std::sync::Arc;

use chrono::Duration;
use ssogate_common::Clock;
use ssogate_domain::constants::DEFAULT_STATE_TTL_SECS;
use ssogate_domain::{
    nonce_prefix, AuthFlowError, ProviderConfig, ProviderErrorBody, Secret, TokenResponse,
    TokenSet,
};
use tracing::{debug, info, warn};

use super::ports::{AuthRequestStore, HttpReply, ProviderTransport};
use super::request_builder::{authorization_code_form, refresh_token_form};

pub struct TokenExchanger {
    config: Arc<ProviderConfig>,
    store: Arc<dyn AuthRequestStore>,
    transport: Arc<dyn ProviderTransport>,
    clock: Arc<dyn Clock>,
    state_ttl: Duration,
}

impl TokenExchanger {
    pub fn new(
        config: Arc<ProviderConfig>,
        store: Arc<dyn AuthRequestStore>,
        transport: Arc<dyn ProviderTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
            clock,
            state_ttl: Duration::seconds(DEFAULT_STATE_TTL_SECS as i64),
        }
    }

    /// Maximum age of a pending request accepted at callback time.
    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }

    /// Trade an authorization code for tokens.
    ///
    /// The pending request is consumed before anything else happens, so a
    /// retry of this call with the same nonce fails with `InvalidState`.
    ///
    /// # Errors
    /// - `InvalidState` when the nonce was never issued, was already used or
    ///   has expired. The provider is not contacted.
    /// - `Transport` when every attempt failed at the network level.
    /// - `TokenEndpoint` when the provider answered with a non-2xx status.
    /// - `MalformedResponse` when the success body is unusable.
    pub async fn exchange_code(
        &self,
        code: &Secret,
        state_nonce: &str,
    ) -> Result<TokenSet, AuthFlowError> {
        let pending = self
            .store
            .take(state_nonce)
            .await
            .map_err(|e| AuthFlowError::Session(e.to_string()))?
            .ok_or(AuthFlowError::InvalidState)?;

        if pending.is_expired(self.clock.now(), self.state_ttl) {
            debug!(state = nonce_prefix(state_nonce), "Pending request expired before callback");
            return Err(AuthFlowError::InvalidState);
        }

        let form = authorization_code_form(&self.config, code, &pending);
        let reply = self.transport.post_form(&self.config.token_endpoint, &form).await?;
        let token_set = self.read_token_reply(reply, None)?;

        info!(
            state = pending.nonce_prefix(),
            has_refresh_token = token_set.refresh_token.is_some(),
            expires_at = %token_set.expires_at,
            "Authorization code exchanged"
        );
        Ok(token_set)
    }

    /// Use the refresh token of `current` to obtain a new `TokenSet`.
    ///
    /// `current` is left untouched. Tokens the provider does not reissue are
    /// carried over.
    ///
    /// # Errors
    /// `Config` when `current` has no refresh token, otherwise as for
    /// [`Self::exchange_code`] minus `InvalidState`.
    pub async fn refresh(&self, current: &TokenSet) -> Result<TokenSet, AuthFlowError> {
        let refresh_token = current
            .refresh_token
            .as_ref()
            .ok_or_else(|| AuthFlowError::Config("token set has no refresh token".into()))?;

        let form = refresh_token_form(&self.config, refresh_token);
        let reply = self.transport.post_form(&self.config.token_endpoint, &form).await?;
        let token_set = self.read_token_reply(reply, Some(current))?;

        info!(expires_at = %token_set.expires_at, "Tokens refreshed");
        Ok(token_set)
    }

    fn read_token_reply(
        &self,
        reply: HttpReply,
        previous: Option<&TokenSet>,
    ) -> Result<TokenSet, AuthFlowError> {
        if !reply.is_success() {
            let provider_error_code = ProviderErrorBody::error_code(&reply.body);
            warn!(
                status = reply.status,
                provider_error = provider_error_code.as_deref().unwrap_or("-"),
                "Token endpoint rejected request"
            );
            return Err(AuthFlowError::TokenEndpoint { status: reply.status, provider_error_code });
        }

        let received_at = self.clock.now();
        reply.json::<TokenResponse>()?.into_token_set(received_at, previous)
    }
}
