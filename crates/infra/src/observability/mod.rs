//! Tracing subscriber setup
//!
//! The filter comes from `RUST_LOG` (default [`DEFAULT_LOG_FILTER`]); the
//! output format from `SSOGATE_LOG_FORMAT` (`json` or human-readable text).
//! Security events are emitted under the `ssogate::security` target and can
//! be filtered on their own, e.g. `RUST_LOG=warn,ssogate::security=info`.

use ssogate_domain::SsoGateError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "info,ssogate=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Format named by `SSOGATE_LOG_FORMAT`; anything but `json` is text.
    pub fn from_env() -> Self {
        Self::parse(std::env::var("SSOGATE_LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber.
///
/// # Errors
/// `SsoGateError::Internal` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<(), SsoGateError> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(false)).try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
    };

    result.map_err(|e| SsoGateError::Internal(format!("tracing subscriber not installed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_json_selects_json() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }

    #[test]
    fn second_install_is_an_error() {
        let _ = init_tracing(LogFormat::Text);
        assert!(matches!(init_tracing(LogFormat::Json), Err(SsoGateError::Internal(_))));
    }
}
