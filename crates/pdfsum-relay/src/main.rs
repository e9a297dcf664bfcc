use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use pdfsum_core::Config;

mod handlers;
mod state;

use state::AppState;

const DEFAULT_ADDR: &str = "127.0.0.1:5002";

/// Largest accepted request body.
const BODY_LIMIT: usize = 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/summarize", post(handlers::summarize::summarize))
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let file_config = pdfsum_core::config_file::load_config();
    let mut config = Config::resolve(&file_config, |key| std::env::var(key).ok());
    // The relay always talks to the model API itself
    config.relay_url = None;
    if config.api_key.is_none() {
        anyhow::bail!("OPENAI_API_KEY must be set for the relay");
    }
    tracing::info!(?config, "relay configuration");

    let state = Arc::new(AppState {
        summarizer: pdfsum_core::build_summarizer(&config),
    });

    let addr: SocketAddr = std::env::var("PDFSUM_RELAY_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .context("invalid PDFSUM_RELAY_ADDR")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
