//! Router wired to a wiremock provider for HTTP surface tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response};
use axum::Router;
use serde_json::json;
use ssogate_api::{build_router, AppContext};
use ssogate_common::testing::{id_token_claims, jwks, TestSigner};
use ssogate_common::{Clock, SystemClock};
use ssogate_domain::{
    Config, HttpConfig, ProviderConfig, ProviderSettings, SecurityConfig, ServerConfig,
};
use ssogate_infra::HttpClient;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REALM: &str = "test_realm";
pub const CLIENT_ID: &str = "test_client";
pub const HOME_PATH: &str = "/";

pub fn token_path() -> String {
    format!("/realms/{REALM}/protocol/openid-connect/token")
}

pub fn certs_path() -> String {
    format!("/realms/{REALM}/protocol/openid-connect/certs")
}

pub fn config(base_url: &str) -> Config {
    Config {
        provider: ProviderSettings {
            base_url: base_url.to_string(),
            internal_base_url: None,
            realm: REALM.into(),
            client_id: CLIENT_ID.into(),
            client_secret: None,
            redirect_uri: "http://localhost:8081/callback".into(),
            scopes: vec!["openid".into(), "profile".into(), "email".into()],
            discovery: false,
            issuer: None,
            authorization_endpoint: None,
            token_endpoint: None,
            jwks_uri: None,
        },
        server: ServerConfig { bind_addr: "127.0.0.1:0".into(), home_path: HOME_PATH.into() },
        security: SecurityConfig::default(),
        http: HttpConfig { timeout_secs: 2, max_attempts: 1, base_backoff_ms: 5 },
    }
}

/// Mock provider, signing key and router sharing one context.
pub struct App {
    pub server: MockServer,
    pub signer: TestSigner,
    pub context: Arc<AppContext>,
    pub router: Router,
}

impl App {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let signer = TestSigner::primary();
        Mock::given(method("GET"))
            .and(path(certs_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks(&[&signer])))
            .mount(&server)
            .await;

        let config = config(&server.uri());
        let provider = ProviderConfig::from_settings(&config.provider).expect("provider config");
        let transport = Arc::new(HttpClient::from_config(&config.http).expect("http client"));
        let context =
            Arc::new(AppContext::from_parts(config, provider, transport, Arc::new(SystemClock)));
        let router = build_router(context.clone());

        Self { server, signer, context, router }
    }

    /// Answer the next token request with a valid ID token for `subject`.
    pub async fn provider_issues_token_for(&self, subject: &str) {
        let issuer = format!("{}/realms/{REALM}", self.server.uri());
        let id_token =
            self.signer.sign(&id_token_claims(&issuer, CLIENT_ID, subject, SystemClock.now(), 300));
        Mock::given(method("POST"))
            .and(path(token_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-token",
                "id_token": id_token,
                "expires_in": 300,
                "token_type": "Bearer",
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response<Body> {
        self.send("GET", uri, session).await
    }

    pub async fn send(&self, verb: &str, uri: &str, session: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method(verb).uri(uri);
        if let Some(id) = session {
            request = request.header(COOKIE, format!("ssogate_session={id}"));
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("router is infallible")
    }

    /// Run `/login` and return the state nonce from the provider redirect.
    pub async fn begin_login(&self) -> String {
        let response = self.get("/login", None).await;
        let location = Url::parse(location(&response)).expect("absolute redirect");
        location
            .query_pairs()
            .find(|(name, _)| name == "state")
            .map(|(_, value)| value.into_owned())
            .expect("state parameter")
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[LOCATION].to_str().expect("ascii location")
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response.headers().get(SET_COOKIE).map(|v| v.to_str().expect("ascii cookie").to_string())
}

/// Session id carried by a `Set-Cookie` value.
pub fn session_id(cookie: &str) -> String {
    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .expect("cookie pair")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
