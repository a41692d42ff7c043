//! Shared wiremock provider for infra integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use ssogate_common::testing::{id_token_claims, jwks, TestSigner};
use ssogate_common::{Clock, SystemClock};
use ssogate_core::{FlowPorts, FlowSettings, LoginFlow};
use ssogate_domain::{ProviderConfig, ProviderSettings};
use ssogate_infra::{HttpClient, InMemorySessionStore, PendingRequestCache};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REALM: &str = "test_realm";
pub const CLIENT_ID: &str = "test_client";
pub const REDIRECT_URI: &str = "http://localhost:8081/callback";

pub fn realm_path(suffix: &str) -> String {
    format!("/realms/{REALM}{suffix}")
}

pub fn token_path() -> String {
    realm_path("/protocol/openid-connect/token")
}

pub fn certs_path() -> String {
    realm_path("/protocol/openid-connect/certs")
}

/// Settings pointing both channels at `base_url`.
pub fn settings(base_url: &str) -> ProviderSettings {
    ProviderSettings {
        base_url: base_url.to_string(),
        internal_base_url: None,
        realm: REALM.into(),
        client_id: CLIENT_ID.into(),
        client_secret: None,
        redirect_uri: REDIRECT_URI.into(),
        scopes: vec!["openid".into(), "profile".into(), "email".into()],
        discovery: false,
        issuer: None,
        authorization_endpoint: None,
        token_endpoint: None,
        jwks_uri: None,
    }
}

pub fn http_client() -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(2))
        .base_backoff(Duration::from_millis(5))
        .max_attempts(2)
        .build()
        .expect("http client")
}

pub async fn mount_jwks(server: &MockServer, signers: &[&TestSigner]) {
    Mock::given(method("GET"))
        .and(path(certs_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks(signers)))
        .mount(server)
        .await;
}

/// Signed ID token for the test client, issued now by the server's realm.
pub fn id_token(server: &MockServer, signer: &TestSigner, subject: &str) -> String {
    let issuer = format!("{}{}", server.uri(), realm_path(""));
    signer.sign(&id_token_claims(&issuer, CLIENT_ID, subject, SystemClock.now(), 300))
}

pub fn token_response(id_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "access-token",
        "id_token": id_token,
        "refresh_token": "refresh-token",
        "expires_in": 300,
        "token_type": "Bearer",
    }))
}

/// A login flow wired to real infra adapters and the mock server.
pub struct Stack {
    pub flow: LoginFlow,
    pub requests: Arc<PendingRequestCache>,
    pub sessions: Arc<InMemorySessionStore>,
}

pub fn stack(config: ProviderConfig) -> Stack {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let requests = Arc::new(PendingRequestCache::new(
        chrono::Duration::seconds(600),
        100,
        clock.clone(),
    ));
    let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));

    let flow = LoginFlow::new(
        Arc::new(config),
        FlowSettings {
            redirect_uri: REDIRECT_URI.into(),
            clock_skew: chrono::Duration::seconds(60),
            state_ttl: chrono::Duration::seconds(600),
            jwks_min_refresh: chrono::Duration::seconds(30),
        },
        FlowPorts {
            requests: requests.clone(),
            sessions: sessions.clone(),
            transport: Arc::new(http_client()),
            clock,
        },
    );

    Stack { flow, requests, sessions }
}
