//! Resolved identity provider endpoints
//!
//! `ProviderConfig` is built once at startup, either from the Keycloak realm
//! layout or from a discovery document, and shared read-only afterwards.

use serde::Deserialize;
use url::Url;

use crate::config::{parse_http_url, ProviderSettings};
use crate::constants::{KEYCLOAK_OIDC_PATH, KEYCLOAK_REALMS_PATH, WELL_KNOWN_OIDC_PATH};
use crate::{AuthFlowError, Secret};

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub jwks_uri: Url,
    pub issuer: String,
    pub client_id: String,
    pub client_secret: Option<Secret>,
    pub scopes: Vec<String>,
}

/// Fields of `/.well-known/openid-configuration` the relying party uses.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
}

fn config_err(err: crate::SsoGateError) -> AuthFlowError {
    match err {
        crate::SsoGateError::Config(msg) => AuthFlowError::Config(msg),
        other => AuthFlowError::Config(other.to_string()),
    }
}

fn url(field: &str, value: &str) -> Result<Url, AuthFlowError> {
    parse_http_url(field, value).map_err(config_err)
}

impl ProviderConfig {
    /// Issuer implied by the settings: explicit override or
    /// `{base_url}/realms/{realm}`.
    pub fn expected_issuer(settings: &ProviderSettings) -> String {
        settings.issuer.clone().unwrap_or_else(|| {
            format!(
                "{}/{}/{}",
                settings.base_url.trim_end_matches('/'),
                KEYCLOAK_REALMS_PATH,
                settings.realm
            )
        })
    }

    /// Discovery document location for the settings.
    pub fn discovery_url(settings: &ProviderSettings) -> Result<Url, AuthFlowError> {
        let issuer = Self::expected_issuer(settings);
        let base = back_channel_base(settings).map(|b| rebase_issuer(&issuer, settings, b));
        let root = base.unwrap_or(issuer);
        url("discovery url", &format!("{}/{}", root.trim_end_matches('/'), WELL_KNOWN_OIDC_PATH))
    }

    /// Static configuration following the Keycloak realm layout, with any
    /// explicit endpoint overrides applied.
    ///
    /// # Errors
    /// `AuthFlowError::Config` if a URL is invalid or `client_id` is empty.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, AuthFlowError> {
        let front = settings.base_url.trim_end_matches('/');
        let back = back_channel_base(settings).unwrap_or(front);
        let realm_path = format!("{}/{}/{}", KEYCLOAK_REALMS_PATH, settings.realm, KEYCLOAK_OIDC_PATH);

        let authorization_endpoint = match &settings.authorization_endpoint {
            Some(explicit) => url("provider.authorization_endpoint", explicit)?,
            None => url("provider.base_url", &format!("{front}/{realm_path}/auth"))?,
        };
        let token_endpoint = match &settings.token_endpoint {
            Some(explicit) => url("provider.token_endpoint", explicit)?,
            None => url("provider.internal_base_url", &format!("{back}/{realm_path}/token"))?,
        };
        let jwks_uri = match &settings.jwks_uri {
            Some(explicit) => url("provider.jwks_uri", explicit)?,
            None => url("provider.internal_base_url", &format!("{back}/{realm_path}/certs"))?,
        };

        let config = Self {
            authorization_endpoint,
            token_endpoint,
            jwks_uri,
            issuer: Self::expected_issuer(settings),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone().filter(|s| !s.is_empty()),
            scopes: settings.scopes.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration from a discovery document. Back-channel endpoints are
    /// moved onto `internal_base_url` when one is set.
    ///
    /// # Errors
    /// `AuthFlowError::Config` if the document's issuer differs from the
    /// expected one or a URL is invalid.
    pub fn from_discovery(
        settings: &ProviderSettings,
        document: DiscoveryDocument,
    ) -> Result<Self, AuthFlowError> {
        let expected = Self::expected_issuer(settings);
        if document.issuer != expected {
            return Err(AuthFlowError::Config(format!(
                "discovered issuer '{}' does not match expected '{}'",
                document.issuer, expected
            )));
        }

        let mut token_endpoint = url("token_endpoint", &document.token_endpoint)?;
        let mut jwks_uri = url("jwks_uri", &document.jwks_uri)?;
        if let Some(internal) = &settings.internal_base_url {
            let internal = url("provider.internal_base_url", internal)?;
            rebase_origin(&mut token_endpoint, &internal)?;
            rebase_origin(&mut jwks_uri, &internal)?;
        }

        let config = Self {
            authorization_endpoint: url("authorization_endpoint", &document.authorization_endpoint)?,
            token_endpoint,
            jwks_uri,
            issuer: document.issuer,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone().filter(|s| !s.is_empty()),
            scopes: settings.scopes.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Public clients authenticate with PKCE instead of a secret.
    pub fn is_public_client(&self) -> bool {
        self.client_secret.is_none()
    }

    /// # Errors
    /// `AuthFlowError::Config` naming the incomplete field.
    pub fn validate(&self) -> Result<(), AuthFlowError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthFlowError::Config("client_id is empty".into()));
        }
        if self.issuer.trim().is_empty() {
            return Err(AuthFlowError::Config("issuer is empty".into()));
        }
        if !self.scopes.iter().any(|s| s == "openid") {
            return Err(AuthFlowError::Config("scopes must include 'openid'".into()));
        }
        Ok(())
    }
}

fn back_channel_base(settings: &ProviderSettings) -> Option<&str> {
    settings.internal_base_url.as_deref().map(|b| b.trim_end_matches('/'))
}

fn rebase_issuer(issuer: &str, settings: &ProviderSettings, internal: &str) -> String {
    let front = settings.base_url.trim_end_matches('/');
    match issuer.strip_prefix(front) {
        Some(rest) => format!("{internal}{rest}"),
        None => issuer.to_string(),
    }
}

fn rebase_origin(target: &mut Url, origin: &Url) -> Result<(), AuthFlowError> {
    let err = |url: &Url| AuthFlowError::Config(format!("cannot move '{url}' onto '{origin}'"));
    target.set_scheme(origin.scheme()).map_err(|_| err(target))?;
    target.set_host(origin.host_str()).map_err(|_| err(target))?;
    target.set_port(origin.port()).map_err(|_| err(target))?;
    Ok(())
}
