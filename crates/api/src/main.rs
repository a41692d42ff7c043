//! ssogate - OIDC login gateway
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ssogate_api::{build_router, AppContext};
use ssogate_infra::{init_tracing, LogFormat};
use tokio::net::TcpListener;
use tracing::{info, warn};

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before tracing so SSOGATE_LOG_FORMAT and RUST_LOG apply
    let dotenv = dotenvy::dotenv();
    init_tracing(LogFormat::from_env())?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => warn!("Could not load .env file: {}", e),
    }

    let config = ssogate_infra::config::load().context("loading configuration")?;
    let bind_addr = config.server.bind_addr.clone();

    let context = Arc::new(AppContext::new(config).await.context("initialising login flow")?);
    context.warm_up().await;
    let housekeeping = context.spawn_housekeeping(HOUSEKEEPING_INTERVAL);

    let listener =
        TcpListener::bind(&bind_addr).await.with_context(|| format!("binding {bind_addr}"))?;
    info!(addr = %bind_addr, "ssogate listening");

    axum::serve(listener, build_router(context))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    housekeeping.abort();
    info!("ssogate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
