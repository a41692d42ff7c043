//! Authorization redirect and token request construction
//!
//! Building a redirect has one side effect: the new `AuthRequestState` is
//! stored under its state nonce. No network call is made.

use std::sync::Arc;

use ssogate_common::auth::{generate_state, PkcePair};
use ssogate_common::Clock;
use ssogate_domain::constants::{
    GRANT_TYPE_AUTHORIZATION_CODE, GRANT_TYPE_REFRESH_TOKEN, PKCE_METHOD_S256, RESPONSE_TYPE_CODE,
};
use ssogate_domain::{parse_http_url, AuthFlowError, AuthRequestState, ProviderConfig, Secret};
use tracing::debug;
use url::Url;

use super::ports::AuthRequestStore;

/// Form fields of a token endpoint request. Values are `Secret` so the body
/// can be passed around without leaking codes or credentials.
pub type TokenForm = Vec<(&'static str, Secret)>;

pub struct RequestBuilder {
    config: Arc<ProviderConfig>,
    store: Arc<dyn AuthRequestStore>,
    clock: Arc<dyn Clock>,
}

impl RequestBuilder {
    pub fn new(
        config: Arc<ProviderConfig>,
        store: Arc<dyn AuthRequestStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { config, store, clock }
    }

    /// Start a login attempt: returns the provider redirect URL and the
    /// stored pending state.
    ///
    /// Public clients get a PKCE S256 challenge; confidential clients
    /// authenticate with their secret at the token endpoint instead.
    ///
    /// # Errors
    /// `AuthFlowError::Config` if `redirect_uri` is empty or not an absolute
    /// http(s) URL, or the provider config is incomplete.
    /// `AuthFlowError::Session` if the pending state cannot be stored.
    pub async fn build_authorization_request(
        &self,
        redirect_uri: &str,
    ) -> Result<(Url, AuthRequestState), AuthFlowError> {
        if redirect_uri.trim().is_empty() {
            return Err(AuthFlowError::Config("redirect_uri is required".into()));
        }
        parse_http_url("redirect_uri", redirect_uri)
            .map_err(|e| AuthFlowError::Config(e.to_string()))?;
        self.config.validate()?;

        let pkce = self.config.is_public_client().then(PkcePair::generate);
        let state = AuthRequestState {
            state_nonce: generate_state(),
            code_verifier: pkce.as_ref().map(|p| Secret::new(p.code_verifier.clone())),
            redirect_uri: redirect_uri.to_string(),
            created_at: self.clock.now(),
        };

        let url = authorization_url(
            &self.config,
            &state.state_nonce,
            redirect_uri,
            pkce.as_ref().map(|p| p.code_challenge.as_str()),
        );

        self.store
            .insert(state.clone())
            .await
            .map_err(|e| AuthFlowError::Session(e.to_string()))?;

        debug!(
            state = state.nonce_prefix(),
            pkce = pkce.is_some(),
            "Authorization request created"
        );

        Ok((url, state))
    }
}

/// Authorization endpoint URL with the request parameters appended.
pub fn authorization_url(
    config: &ProviderConfig,
    state_nonce: &str,
    redirect_uri: &str,
    code_challenge: Option<&str>,
) -> Url {
    let mut url = config.authorization_endpoint.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", RESPONSE_TYPE_CODE)
            .append_pair("client_id", &config.client_id)
            .append_pair("state", state_nonce)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &config.scopes.join(" "));
        if let Some(challenge) = code_challenge {
            query
                .append_pair("code_challenge", challenge)
                .append_pair("code_challenge_method", PKCE_METHOD_S256);
        }
    }
    url
}

/// Body of the `authorization_code` grant for a consumed pending request.
pub fn authorization_code_form(
    config: &ProviderConfig,
    code: &Secret,
    request: &AuthRequestState,
) -> TokenForm {
    let mut form = vec![
        ("grant_type", Secret::new(GRANT_TYPE_AUTHORIZATION_CODE)),
        ("code", code.clone()),
        ("redirect_uri", Secret::new(request.redirect_uri.clone())),
        ("client_id", Secret::new(config.client_id.clone())),
    ];
    push_client_auth(&mut form, config, request.code_verifier.as_ref());
    form
}

/// Body of the `refresh_token` grant.
pub fn refresh_token_form(config: &ProviderConfig, refresh_token: &Secret) -> TokenForm {
    let mut form = vec![
        ("grant_type", Secret::new(GRANT_TYPE_REFRESH_TOKEN)),
        ("refresh_token", refresh_token.clone()),
        ("client_id", Secret::new(config.client_id.clone())),
    ];
    push_client_auth(&mut form, config, None);
    form
}

fn push_client_auth(form: &mut TokenForm, config: &ProviderConfig, verifier: Option<&Secret>) {
    if let Some(secret) = &config.client_secret {
        form.push(("client_secret", secret.clone()));
    }
    if let Some(verifier) = verifier {
        form.push(("code_verifier", verifier.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            authorization_endpoint: Url::parse(
                "http://sso/realms/test_realm/protocol/openid-connect/auth",
            )
            .unwrap(),
            token_endpoint: Url::parse("http://sso/realms/test_realm/protocol/openid-connect/token")
                .unwrap(),
            jwks_uri: Url::parse("http://sso/realms/test_realm/protocol/openid-connect/certs")
                .unwrap(),
            issuer: "http://sso/realms/test_realm".into(),
            client_id: "test_client".into(),
            client_secret: secret.map(Secret::new),
            scopes: vec!["openid".into(), "email".into()],
        }
    }

    fn pending(verifier: Option<&str>) -> AuthRequestState {
        AuthRequestState {
            state_nonce: "nonce".into(),
            code_verifier: verifier.map(Secret::new),
            redirect_uri: "http://app/callback".into(),
            created_at: chrono::Utc::now(),
        }
    }

    fn field<'a>(form: &'a TokenForm, name: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| *k == name).map(|(_, v)| v.expose())
    }

    #[test]
    fn url_parameters_follow_fixed_order() {
        let url = authorization_url(&config(None), "abc", "http://app/callback", Some("chal"));
        let query = url.query().unwrap();

        assert!(query.starts_with("response_type=code&client_id=test_client&state=abc&"));
        assert!(query.contains("redirect_uri=http%3A%2F%2Fapp%2Fcallback"));
        assert!(query.contains("scope=openid+email"));
        assert!(query.ends_with("code_challenge=chal&code_challenge_method=S256"));
    }

    #[test]
    fn url_omits_pkce_without_challenge() {
        let url = authorization_url(&config(Some("s")), "abc", "http://app/callback", None);
        assert!(!url.as_str().contains("code_challenge"));
    }

    #[test]
    fn public_client_form_carries_verifier() {
        let form = authorization_code_form(&config(None), &Secret::new("the-code"), &pending(Some("v")));

        assert_eq!(field(&form, "grant_type"), Some("authorization_code"));
        assert_eq!(field(&form, "code"), Some("the-code"));
        assert_eq!(field(&form, "redirect_uri"), Some("http://app/callback"));
        assert_eq!(field(&form, "client_id"), Some("test_client"));
        assert_eq!(field(&form, "code_verifier"), Some("v"));
        assert_eq!(field(&form, "client_secret"), None);
    }

    #[test]
    fn confidential_client_form_carries_secret() {
        let form = authorization_code_form(&config(Some("shh")), &Secret::new("c"), &pending(None));
        assert_eq!(field(&form, "client_secret"), Some("shh"));
        assert_eq!(field(&form, "code_verifier"), None);
    }

    #[test]
    fn refresh_form() {
        let form = refresh_token_form(&config(Some("shh")), &Secret::new("rt"));
        assert_eq!(field(&form, "grant_type"), Some("refresh_token"));
        assert_eq!(field(&form, "refresh_token"), Some("rt"));
        assert_eq!(field(&form, "client_secret"), Some("shh"));
    }

    #[test]
    fn form_debug_is_redacted() {
        let form = authorization_code_form(&config(Some("shh")), &Secret::new("c0de"), &pending(None));
        let rendered = format!("{form:?}");
        assert!(!rendered.contains("c0de"));
        assert!(!rendered.contains("shh"));
    }
}
