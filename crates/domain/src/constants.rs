//! Application constants
//!
//! Centralized location for protocol and default values used throughout the
//! application.

// Protocol parameters
pub const RESPONSE_TYPE_CODE: &str = "code";
pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
pub const PKCE_METHOD_S256: &str = "S256";
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];

// Keycloak realm layout
pub const KEYCLOAK_REALMS_PATH: &str = "realms";
pub const KEYCLOAK_OIDC_PATH: &str = "protocol/openid-connect";
pub const WELL_KNOWN_OIDC_PATH: &str = ".well-known/openid-configuration";

// Security defaults
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 60;
pub const DEFAULT_STATE_TTL_SECS: u64 = 600;
pub const DEFAULT_JWKS_MIN_REFRESH_SECS: u64 = 30;
pub const DEFAULT_MAX_PENDING_REQUESTS: u64 = 10_000;
/// Random bytes behind every state nonce and session id (256 bits).
pub const OPAQUE_TOKEN_BYTES: usize = 32;

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_HTTP_BASE_BACKOFF_MS: u64 = 200;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";

// Session cookie
pub const SESSION_COOKIE_NAME: &str = "ssogate_session";
