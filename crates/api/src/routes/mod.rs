//! HTTP surface
//!
//! | Method     | Path        | Handler    |
//! |------------|-------------|------------|
//! | GET        | `/`         | `home`     |
//! | GET        | `/login`    | `login`    |
//! | GET        | `/callback` | `callback` |
//! | GET, POST  | `/logout`   | `logout`   |
//! | GET        | `/healthz`  | `healthz`  |

pub mod auth;
pub mod pages;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::AppContext;

/// Build the application router around a shared context.
pub fn build_router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/healthz", get(pages::healthz))
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout).post(auth::logout))
        .with_state(context)
}
