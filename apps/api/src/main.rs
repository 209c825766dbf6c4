mod config;
mod documents;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;
#[cfg(test)]
mod test_support;
mod tokenizer;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::documents::DocumentFetcher;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::scorer::LlmCompatibilityScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing GEMINI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Tokenizer support data is built once, before the first request
    tokenizer::init();

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.analyzer.clone())
        .context("Failed to build LLM HTTP client")?;
    info!(
        "LLM client initialized (models: {})",
        config.analyzer.models.join(" -> ")
    );

    // Initialize document fetcher
    let fetcher = DocumentFetcher::new(config.fetcher.clone())
        .context("Failed to build document fetcher HTTP client")?;

    let state = AppState {
        fetcher,
        scorer: Arc::new(LlmCompatibilityScorer::new(llm)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins once the UI host is fixed
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
