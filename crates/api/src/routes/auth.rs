//! Login, callback and logout handlers

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use ssogate_domain::{nonce_prefix, AuthFlowError, Secret};
use tracing::{info, warn};

use super::pages::sign_in_failed;
use crate::utils::cookies;
use crate::utils::logging::log_route_outcome;
use crate::AppContext;

/// Query string the provider appends to the redirect URI.
///
/// No `Debug`: `code` is a credential.
#[derive(Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Start a login: remember the request and send the browser to the provider.
pub async fn login(State(context): State<Arc<AppContext>>) -> Response {
    let started = Instant::now();

    match context.flow.begin().await {
        Ok((url, _)) => {
            log_route_outcome("login", started.elapsed(), true, "redirect");
            redirect(url.as_str(), None)
        }
        Err(err) => {
            log_route_outcome("login", started.elapsed(), false, err.label());
            (StatusCode::SERVICE_UNAVAILABLE, sign_in_failed()).into_response()
        }
    }
}

/// Finish a login: exchange the code, validate the ID token and set the
/// session cookie. Every failure renders the same page.
pub async fn callback(
    State(context): State<Arc<AppContext>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let started = Instant::now();

    if let Some(error) = params.error.as_deref() {
        warn!(
            provider_error = error,
            description = params.error_description.as_deref().unwrap_or_default(),
            "Provider returned an error to the callback"
        );
        log_route_outcome("callback", started.elapsed(), false, "provider_error");
        return (StatusCode::BAD_REQUEST, sign_in_failed()).into_response();
    }

    let (Some(code), Some(state)) = (params.code, params.state) else {
        log_route_outcome("callback", started.elapsed(), false, "missing_parameters");
        return (StatusCode::BAD_REQUEST, sign_in_failed()).into_response();
    };
    let code = Secret::new(code);

    match context.flow.complete(&code, &state).await {
        Ok(handle) => {
            let remaining = (handle.expires_at - context.clock.now()).num_seconds();
            let cookie = cookies::session_cookie(
                handle.session_id.expose(),
                remaining,
                context.config.cookie_secure(),
            );
            info!(state = nonce_prefix(&state), "Signed in");
            log_route_outcome("callback", started.elapsed(), true, "session_bound");
            redirect(&context.config.server.home_path, Some(cookie))
        }
        Err(err) => {
            log_route_outcome("callback", started.elapsed(), false, err.label());
            (failure_status(&err), sign_in_failed()).into_response()
        }
    }
}

/// Drop the session, if any, and clear the cookie.
pub async fn logout(State(context): State<Arc<AppContext>>, headers: HeaderMap) -> Response {
    let started = Instant::now();

    if let Some(id) = cookies::session_id(&headers) {
        match context.flow.binder().logout(&id).await {
            Ok(existed) => info!(existed, "Signed out"),
            Err(err) => warn!(error = %err, event = err.label(), "Session removal failed"),
        }
    }

    log_route_outcome("logout", started.elapsed(), true, "redirect");
    redirect(
        &context.config.server.home_path,
        Some(cookies::clear_session_cookie(context.config.cookie_secure())),
    )
}

fn failure_status(err: &AuthFlowError) -> StatusCode {
    match err {
        AuthFlowError::InvalidState => StatusCode::BAD_REQUEST,
        AuthFlowError::Transport(_)
        | AuthFlowError::TokenEndpoint { .. }
        | AuthFlowError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        AuthFlowError::MalformedToken(_)
        | AuthFlowError::UnknownSigningKey { .. }
        | AuthFlowError::SignatureInvalid(_)
        | AuthFlowError::ClaimInvalid { .. } => StatusCode::UNAUTHORIZED,
        AuthFlowError::Config(_) | AuthFlowError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redirect(location: &str, cookie: Option<String>) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();

    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
        }
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        headers.append(SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use ssogate_domain::ClaimKind;

    use super::*;

    #[test]
    fn validation_failures_are_unauthorized() {
        assert_eq!(
            failure_status(&AuthFlowError::ClaimInvalid { which: ClaimKind::Audience }),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(failure_status(&AuthFlowError::InvalidState), StatusCode::BAD_REQUEST);
        assert_eq!(
            failure_status(&AuthFlowError::TokenEndpoint { status: 400, provider_error_code: None }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn redirect_sets_location_and_cookie() {
        let response = redirect("/home", Some("ssogate_session=x".into()));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/home");
        assert_eq!(response.headers()[SET_COOKIE], "ssogate_session=x");
    }
}
