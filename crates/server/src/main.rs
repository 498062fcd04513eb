//! recipe-radar proxy entry point.
//!
//! Serves the JSON API the offline layer intercepts, forwarding to the
//! upstream recipe catalog. Logs go to stderr as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use radar_client::{MealDbClient, UpstreamConfig};
use radar_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod categories;
mod error;
mod routes;
mod state;

#[cfg(test)]
mod testing;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "radar_server=info,radar_client=info,radar_core=info,tower_http=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let upstream = MealDbClient::new(UpstreamConfig::from(&config))?;
    let state = AppState::new(Arc::new(upstream), config.category_ttl());
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, upstream = %config.upstream_base_url, "recipe-radar listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
    }
}
