use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use tracing::warn;

use crate::utils::cookies;
use crate::AppContext;

/// Landing page: a sign-in link, or who is signed in.
pub async fn home(State(context): State<Arc<AppContext>>, headers: HeaderMap) -> Html<String> {
    let record = match cookies::session_id(&headers) {
        Some(id) => match context.flow.binder().resolve(&id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, event = err.label(), "Session lookup failed");
                None
            }
        },
        None => None,
    };

    match record {
        Some(record) => {
            let name = record.display_name.as_deref().unwrap_or(&record.subject);
            page(
                "Signed in",
                &format!(
                    "<p>Signed in as <strong>{}</strong> (<code>{}</code>).</p>\
                     <form method=\"post\" action=\"/logout\"><button type=\"submit\">Sign out</button></form>",
                    escape_html(name),
                    escape_html(&record.subject)
                ),
            )
        }
        None => page("Welcome", "<p><a href=\"/login\">Sign in</a></p>"),
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub(crate) fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body><h1>{title}</h1>{body}</body>\n</html>"
    ))
}

/// Failure page shared by every callback error; the cause is only logged.
pub(crate) fn sign_in_failed() -> Html<String> {
    page(
        "Sign-in failed",
        "<p>We could not sign you in. Please <a href=\"/login\">try again</a>.</p>",
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
