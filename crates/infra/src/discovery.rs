//! Provider endpoint resolution
//!
//! Produces the `ProviderConfig` used for the lifetime of the process, either
//! from the realm layout in the settings or from the provider's discovery
//! document.

use ssogate_core::ProviderTransport;
use ssogate_domain::{AuthFlowError, DiscoveryDocument, ProviderConfig, ProviderSettings};
use tracing::{info, warn};

/// Build the provider configuration, fetching the discovery document when
/// `settings.discovery` is set.
///
/// # Errors
/// `Config` for invalid settings or a discovery document whose issuer does
/// not match; `Transport`, `TokenEndpoint` or `MalformedResponse` when the
/// document cannot be fetched or read.
pub async fn resolve_provider(
    settings: &ProviderSettings,
    transport: &dyn ProviderTransport,
) -> Result<ProviderConfig, AuthFlowError> {
    if !settings.discovery {
        let config = ProviderConfig::from_settings(settings)?;
        info!(issuer = %config.issuer, "Using static provider configuration");
        return Ok(config);
    }

    let url = ProviderConfig::discovery_url(settings)?;
    info!(%url, "Fetching provider discovery document");

    let reply = transport.get_json(&url).await?;
    if !reply.is_success() {
        warn!(%url, status = reply.status, "Discovery endpoint rejected request");
        return Err(AuthFlowError::Transport(format!(
            "discovery endpoint returned HTTP {}",
            reply.status
        )));
    }

    let document: DiscoveryDocument = reply.json()?;
    let config = ProviderConfig::from_discovery(settings, document)?;
    info!(
        issuer = %config.issuer,
        token_endpoint = %config.token_endpoint,
        jwks_uri = %config.jwks_uri,
        "Provider configuration discovered"
    );
    Ok(config)
}
