mod business;
mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod social;
mod state;
mod store;

#[cfg(test)]
mod tests;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::routes::build_router;
use crate::social::twitter::TwitterClient;
use crate::state::AppState;
use crate::store::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting API v{}", env!("CARGO_PKG_VERSION"));

    // Open the flat-file store (creates an empty document if missing)
    let store = FileStore::open(&config.database_path).await?;
    info!("Store opened at {}", config.database_path.display());

    // Initialize completion client
    let llm = CompletionClient::new(config.openai_api_key.clone(), config.openai_base_url.clone());
    info!(
        "Completion client initialized (model: {})",
        llm_client::CHAT_MODEL
    );

    // Initialize Twitter publish adapter
    let twitter = TwitterClient::new(config.twitter);
    info!("Twitter client initialized");

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        llm,
        twitter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
