//! Reads [`Config`] from `SSOGATE_*` variables or a TOML/JSON file.
//!
//! The environment is tried first. When one of the four required variables
//! is missing, the file named by `SSOGATE_CONFIG` is read, or else the first
//! match from [`probe_config_paths`]. Both paths end in [`Config::validate`].
//!
//! Required variables: `SSOGATE_BASE_URL` (browser-facing provider URL),
//! `SSOGATE_REALM`, `SSOGATE_CLIENT_ID` and `SSOGATE_REDIRECT_URI`.
//!
//! Optional variables:
//! - `SSOGATE_INTERNAL_BASE_URL`: server-to-server provider URL
//! - `SSOGATE_CLIENT_SECRET`: confidential clients only; PKCE otherwise
//! - `SSOGATE_SCOPES`: space- or comma-separated
//! - `SSOGATE_DISCOVERY`: read endpoints from the discovery document
//! - `SSOGATE_BIND_ADDR`, `SSOGATE_HOME_PATH`
//! - `SSOGATE_HTTP_TIMEOUT_SECS`, `SSOGATE_HTTP_MAX_ATTEMPTS`
//! - `SSOGATE_CLOCK_SKEW_SECS`, `SSOGATE_STATE_TTL_SECS`
//! - `SSOGATE_JWKS_MIN_REFRESH_SECS`, `SSOGATE_MAX_PENDING_REQUESTS`
//! - `SSOGATE_COOKIE_SECURE`: override the scheme-derived `Secure` flag

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ssogate_domain::{
    Config, HttpConfig, ProviderSettings, Result, Secret, SecurityConfig, ServerConfig,
    SsoGateError,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["config.toml", "ssogate.toml", "config.json", "ssogate.json"];

/// Environment first, file second, then validation.
///
/// # Errors
/// `SsoGateError::Config` when neither source yields a configuration, the
/// file cannot be parsed, or a value fails validation.
pub fn load() -> Result<Config> {
    let config = load_from_env().or_else(|missing| {
        tracing::debug!(reason = %missing, "Environment incomplete, reading config file");
        load_from_file(std::env::var_os("SSOGATE_CONFIG").map(PathBuf::from))
    })?;

    config.validate()?;
    Ok(config)
}

/// Build a [`Config`] from `SSOGATE_*` variables alone.
///
/// Unset optional variables keep the section defaults.
///
/// # Errors
/// `SsoGateError::Config` naming the first missing or unparsable variable.
pub fn load_from_env() -> Result<Config> {
    let mut provider = ProviderSettings {
        base_url: env_var("SSOGATE_BASE_URL")?,
        internal_base_url: env_opt("SSOGATE_INTERNAL_BASE_URL"),
        realm: env_var("SSOGATE_REALM")?,
        client_id: env_var("SSOGATE_CLIENT_ID")?,
        client_secret: env_opt("SSOGATE_CLIENT_SECRET").map(Secret::new),
        redirect_uri: env_var("SSOGATE_REDIRECT_URI")?,
        scopes: Vec::new(),
        discovery: env_bool("SSOGATE_DISCOVERY", false),
        issuer: None,
        authorization_endpoint: None,
        token_endpoint: None,
        jwks_uri: None,
    };
    provider.scopes = match env_opt("SSOGATE_SCOPES") {
        Some(raw) => parse_scopes(&raw),
        None => ssogate_domain::constants::DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
    };

    let server_defaults = ServerConfig::default();
    let server = ServerConfig {
        bind_addr: env_opt("SSOGATE_BIND_ADDR").unwrap_or(server_defaults.bind_addr),
        home_path: env_opt("SSOGATE_HOME_PATH").unwrap_or(server_defaults.home_path),
    };

    let security_defaults = SecurityConfig::default();
    let security = SecurityConfig {
        clock_skew_secs: env_parse("SSOGATE_CLOCK_SKEW_SECS", security_defaults.clock_skew_secs)?,
        state_ttl_secs: env_parse("SSOGATE_STATE_TTL_SECS", security_defaults.state_ttl_secs)?,
        jwks_min_refresh_secs: env_parse(
            "SSOGATE_JWKS_MIN_REFRESH_SECS",
            security_defaults.jwks_min_refresh_secs,
        )?,
        max_pending_requests: env_parse(
            "SSOGATE_MAX_PENDING_REQUESTS",
            security_defaults.max_pending_requests,
        )?,
        cookie_secure: env_opt("SSOGATE_COOKIE_SECURE").map(|raw| parse_bool(&raw)),
    };

    let http_defaults = HttpConfig::default();
    let http = HttpConfig {
        timeout_secs: env_parse("SSOGATE_HTTP_TIMEOUT_SECS", http_defaults.timeout_secs)?,
        max_attempts: env_parse("SSOGATE_HTTP_MAX_ATTEMPTS", http_defaults.max_attempts)?,
        base_backoff_ms: http_defaults.base_backoff_ms,
    };

    Ok(Config { provider, server, security, http })
}

/// Read `path`, or the first probed file when `path` is `None`.
///
/// TOML or JSON is picked from the extension. The result is not validated.
///
/// # Errors
/// `SsoGateError::Config` if there is no file to read or it does not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(explicit) if explicit.exists() => explicit,
        Some(explicit) => {
            return Err(SsoGateError::Config(format!("Config file not found: {}", explicit.display())))
        }
        None => probe_config_paths().ok_or_else(|| {
            SsoGateError::Config("No config file found and SSOGATE_* environment incomplete".into())
        })?,
    };

    tracing::info!(path = %path.display(), "Reading configuration file");
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| SsoGateError::Config(format!("Cannot read {}: {e}", path.display())))?;
    parse_config(&raw, &path)
}

fn parse_config(raw: &str, path: &Path) -> Result<Config> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
        "toml" => toml::from_str(raw).map_err(|e| SsoGateError::Config(format!("Invalid TOML config: {e}"))),
        "json" => {
            serde_json::from_str(raw).map_err(|e| SsoGateError::Config(format!("Invalid JSON config: {e}")))
        }
        other => Err(SsoGateError::Config(format!("Unsupported config format: {other}"))),
    }
}

/// First existing config file among the working directory, its two parents
/// and the executable's directory, trying each name in `CONFIG_FILE_NAMES`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let exe_dir = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf));

    let roots = cwd
        .iter()
        .flat_map(|dir| [dir.clone(), dir.join(".."), dir.join("../..")])
        .chain(exe_dir);

    roots
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|candidate| candidate.is_file())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        SsoGateError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Set and non-empty.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| SsoGateError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key).map(|s| parse_bool(&s)).unwrap_or(default)
}

/// `1`, `true`, `yes` and `on` (any case) are true; anything else is false.
fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
