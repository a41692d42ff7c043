//! Application configuration structures
//!
//! Loaded by `ssogate-infra` from the environment or a TOML/JSON file. Every
//! section except `provider` has defaults.

use std::net::SocketAddr;

use serde::Deserialize;
use url::Url;

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_CLOCK_SKEW_SECS, DEFAULT_HTTP_BASE_BACKOFF_MS,
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_JWKS_MIN_REFRESH_SECS,
    DEFAULT_MAX_PENDING_REQUESTS, DEFAULT_SCOPES, DEFAULT_STATE_TTL_SECS,
};
use crate::{Result, Secret, SsoGateError};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Identity provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Browser-facing provider base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Server-to-server base URL for the token endpoint and JWKS, e.g.
    /// `http://sso:8080`. Defaults to `base_url`.
    #[serde(default)]
    pub internal_base_url: Option<String>,
    pub realm: String,
    pub client_id: String,
    /// Absent for public clients, which use PKCE instead.
    #[serde(default)]
    pub client_secret: Option<Secret>,
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Fetch endpoints from `/.well-known/openid-configuration` at startup.
    #[serde(default)]
    pub discovery: bool,

    // Explicit overrides of the realm layout
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub jwks_uri: Option<String>,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Where the browser lands after a successful sign-in.
    #[serde(default = "default_home_path")]
    pub home_path: String,
}

/// Validation and storage limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_clock_skew")]
    pub clock_skew_secs: u64,
    #[serde(default = "default_state_ttl")]
    pub state_ttl_secs: u64,
    #[serde(default = "default_jwks_min_refresh")]
    pub jwks_min_refresh_secs: u64,
    #[serde(default = "default_max_pending")]
    pub max_pending_requests: u64,
    /// `None` derives the flag from the redirect URI scheme.
    #[serde(default)]
    pub cookie_secure: Option<bool>,
}

/// Provider HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Total attempts, first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

fn default_clock_skew() -> u64 {
    DEFAULT_CLOCK_SKEW_SECS
}

fn default_state_ttl() -> u64 {
    DEFAULT_STATE_TTL_SECS
}

fn default_jwks_min_refresh() -> u64 {
    DEFAULT_JWKS_MIN_REFRESH_SECS
}

fn default_max_pending() -> u64 {
    DEFAULT_MAX_PENDING_REQUESTS
}

fn default_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_max_attempts() -> usize {
    DEFAULT_HTTP_MAX_ATTEMPTS
}

fn default_base_backoff() -> u64 {
    DEFAULT_HTTP_BASE_BACKOFF_MS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr(), home_path: default_home_path() }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            state_ttl_secs: DEFAULT_STATE_TTL_SECS,
            jwks_min_refresh_secs: DEFAULT_JWKS_MIN_REFRESH_SECS,
            max_pending_requests: DEFAULT_MAX_PENDING_REQUESTS,
            cookie_secure: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_HTTP_BASE_BACKOFF_MS,
        }
    }
}

impl SecurityConfig {
    pub fn clock_skew(&self) -> chrono::Duration {
        chrono::Duration::seconds(saturating_secs(self.clock_skew_secs))
    }

    pub fn state_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(saturating_secs(self.state_ttl_secs))
    }

    pub fn jwks_min_refresh(&self) -> chrono::Duration {
        chrono::Duration::seconds(saturating_secs(self.jwks_min_refresh_secs))
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn base_backoff(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.base_backoff_ms)
    }
}

/// Largest whole-second value a `chrono::Duration` can hold.
const MAX_DURATION_SECS: u64 = i64::MAX as u64 / 1_000;

fn saturating_secs(secs: u64) -> i64 {
    secs.min(MAX_DURATION_SECS) as i64
}

impl Config {
    /// Check values serde cannot check.
    ///
    /// # Errors
    /// Returns `SsoGateError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.provider.client_id.trim().is_empty() {
            return Err(SsoGateError::Config("provider.client_id must not be empty".into()));
        }
        if self.provider.realm.trim().is_empty() && self.provider.issuer.is_none() {
            return Err(SsoGateError::Config("provider.realm must not be empty".into()));
        }
        for (field, value) in [
            ("provider.base_url", Some(&self.provider.base_url)),
            ("provider.internal_base_url", self.provider.internal_base_url.as_ref()),
            ("provider.redirect_uri", Some(&self.provider.redirect_uri)),
        ] {
            if let Some(value) = value {
                parse_http_url(field, value)?;
            }
        }
        if !self.provider.scopes.iter().any(|s| s == "openid") {
            return Err(SsoGateError::Config("provider.scopes must include 'openid'".into()));
        }
        self.server.bind_addr.parse::<SocketAddr>().map_err(|e| {
            SsoGateError::Config(format!("Invalid server.bind_addr '{}': {}", self.server.bind_addr, e))
        })?;
        if self.http.max_attempts == 0 {
            return Err(SsoGateError::Config("http.max_attempts must be at least 1".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(SsoGateError::Config("http.timeout_secs must be positive".into()));
        }
        if self.security.state_ttl_secs == 0 {
            return Err(SsoGateError::Config("security.state_ttl_secs must be positive".into()));
        }
        Ok(())
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.security
            .cookie_secure
            .unwrap_or_else(|| self.provider.redirect_uri.starts_with("https://"))
    }
}

/// Parse an absolute `http`/`https` URL.
///
/// # Errors
/// Returns `SsoGateError::Config` naming `field`.
pub fn parse_http_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| SsoGateError::Config(format!("Invalid {field} '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SsoGateError::Config(format!("Unsupported scheme '{other}' in {field}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [provider]
        base_url = "http://localhost:8080"
        realm = "test_realm"
        client_id = "test_client"
        redirect_uri = "http://localhost:8081/callback"
    "#;

    #[test]
    fn minimal_toml_gets_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.provider.scopes, vec!["openid", "profile", "email"]);
        assert!(config.provider.client_secret.is_none());
        assert_eq!(config.server.bind_addr, "0.0.0.0:8081");
        assert_eq!(config.security.clock_skew_secs, 60);
        assert_eq!(config.security.state_ttl_secs, 600);
        assert_eq!(config.http.max_attempts, 3);
        assert!(config.validate().is_ok());
        assert!(!config.cookie_secure());
    }

    #[test]
    fn client_secret_is_redacted_in_debug() {
        let toml = format!("{MINIMAL}\nclient_secret = \"very-secret\"");
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(!format!("{config:?}").contains("very-secret"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.provider.redirect_uri = "not a url".into();
        assert!(matches!(config.validate(), Err(SsoGateError::Config(_))));

        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.provider.scopes = vec!["profile".into()];
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.http.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.provider.client_id = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cookie_secure_follows_redirect_scheme_unless_set() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.provider.redirect_uri = "https://app.example.test/callback".into();
        assert!(config.cookie_secure());

        config.security.cookie_secure = Some(false);
        assert!(!config.cookie_secure());
    }

    #[test]
    fn huge_durations_saturate() {
        let security = SecurityConfig {
            clock_skew_secs: u64::MAX,
            state_ttl_secs: i64::MAX as u64,
            jwks_min_refresh_secs: MAX_DURATION_SECS + 1,
            ..SecurityConfig::default()
        };

        let ceiling = chrono::Duration::seconds(MAX_DURATION_SECS as i64);
        assert_eq!(security.clock_skew(), ceiling);
        assert_eq!(security.state_ttl(), ceiling);
        assert_eq!(security.jwks_min_refresh(), ceiling);
    }

    #[test]
    fn parse_http_url_rejects_other_schemes() {
        assert!(parse_http_url("x", "ftp://host/").is_err());
        assert!(parse_http_url("x", "https://host/").is_ok());
    }
}
