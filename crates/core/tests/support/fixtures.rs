//! Provider configuration and flow wiring used across tests

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use ssogate_common::testing::{id_token_claims, TestSigner};
use ssogate_common::MockClock;
use ssogate_core::{FlowPorts, FlowSettings, LoginFlow};
use ssogate_domain::{ProviderConfig, Secret, TokenSet};
use url::Url;

use super::ports::{InMemoryAuthRequests, InMemorySessions, MockProvider};

pub const ISSUER: &str = "http://sso/realms/test_realm";
pub const CLIENT_ID: &str = "test_client";
pub const REDIRECT_URI: &str = "http://localhost:8081/callback";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn provider_config(client_secret: Option<&str>) -> ProviderConfig {
    ProviderConfig {
        authorization_endpoint: Url::parse(
            "http://localhost:8080/realms/test_realm/protocol/openid-connect/auth",
        )
        .unwrap(),
        token_endpoint: Url::parse("http://sso/realms/test_realm/protocol/openid-connect/token")
            .unwrap(),
        jwks_uri: Url::parse("http://sso/realms/test_realm/protocol/openid-connect/certs").unwrap(),
        issuer: ISSUER.to_string(),
        client_id: CLIENT_ID.to_string(),
        client_secret: client_secret.map(Secret::new),
        scopes: vec!["openid".into(), "profile".into(), "email".into()],
    }
}

pub fn settings() -> FlowSettings {
    FlowSettings {
        redirect_uri: REDIRECT_URI.to_string(),
        clock_skew: Duration::seconds(60),
        state_ttl: Duration::seconds(600),
        jwks_min_refresh: Duration::seconds(30),
    }
}

/// Claims for a token issued now by the test realm to the test client.
pub fn valid_claims(clock: &MockClock, subject: &str) -> Value {
    use ssogate_common::Clock;
    id_token_claims(ISSUER, CLIENT_ID, subject, clock.now(), 300)
}

/// Token endpoint success body carrying `id_token`.
pub fn token_body(id_token: &str) -> Value {
    json!({
        "access_token": "access-token-value",
        "id_token": id_token,
        "refresh_token": "refresh-token-value",
        "expires_in": 300,
        "token_type": "Bearer",
        "scope": "openid profile email",
    })
}

/// A `TokenSet` wrapping `id_token`, as returned by a successful exchange.
pub fn token_set(id_token: String, clock: &MockClock) -> TokenSet {
    use ssogate_common::Clock;
    TokenSet {
        access_token: Secret::new("access-token-value"),
        id_token: Secret::new(id_token),
        refresh_token: Some(Secret::new("refresh-token-value")),
        token_type: "Bearer".into(),
        scope: None,
        expires_at: clock.now() + Duration::seconds(300),
    }
}

/// Everything a flow test needs, with handles on the mocks.
pub struct Harness {
    pub clock: MockClock,
    pub provider: Arc<MockProvider>,
    pub requests: Arc<InMemoryAuthRequests>,
    pub sessions: Arc<InMemorySessions>,
    pub flow: LoginFlow,
    pub signer: TestSigner,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(provider_config(None))
    }

    pub fn with_config(config: ProviderConfig) -> Self {
        let signer = TestSigner::primary();
        let clock = MockClock::at(start_time());
        let provider =
            Arc::new(MockProvider::default().with_jwks(ssogate_common::testing::jwks(&[&signer])));
        let requests = Arc::new(InMemoryAuthRequests::default());
        let sessions = Arc::new(InMemorySessions::default());

        let flow = LoginFlow::new(
            Arc::new(config),
            settings(),
            FlowPorts {
                requests: requests.clone(),
                sessions: sessions.clone(),
                transport: provider.clone(),
                clock: Arc::new(clock.clone()),
            },
        );

        Self { clock, provider, requests, sessions, flow, signer }
    }
}
