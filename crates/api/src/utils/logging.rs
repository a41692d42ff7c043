use std::time::Duration;

use ssogate_domain::SsoGateError;
use tracing::{info, warn};

/// Log the outcome of a route with structured fields.
///
/// `outcome` should be a stable label such as `"redirect"` or an error label;
/// callers must not pass codes, tokens or session ids.
#[inline]
pub fn log_route_outcome(route: &str, elapsed: Duration, success: bool, outcome: &str) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(route, duration_ms, outcome, "route_success");
    } else {
        warn!(route, duration_ms, outcome, "route_failure");
    }
}

/// Convert an `SsoGateError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &SsoGateError) -> &'static str {
    match error {
        SsoGateError::Config(_) => "config",
        SsoGateError::Network(_) => "network",
        SsoGateError::Auth(_) => "auth",
        SsoGateError::Security(_) => "security",
        SsoGateError::NotFound(_) => "not_found",
        SsoGateError::InvalidInput(_) => "invalid_input",
        SsoGateError::Storage(_) => "storage",
        SsoGateError::Internal(_) => "internal",
    }
}
