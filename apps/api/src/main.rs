mod chat;
mod config;
mod dataset;
mod embeddings;
mod errors;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::matcher::{CandidateIndex, Matcher};
use crate::config::Config;
use crate::dataset::load_dataset;
use crate::embeddings::{Embedder, OpenAiEmbedder};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dashboard API v{}", env!("CARGO_PKG_VERSION"));

    // No data, no service: a bad dataset stops the process here
    let dataset = Arc::new(
        load_dataset(&config.dataset_path).context("Failed to load salary dataset")?,
    );

    // Initialize embedding client
    let embedder: Arc<dyn Embedder> = Arc::new(
        OpenAiEmbedder::new(
            config.openai_api_key.clone(),
            config.embedding_api_url.clone(),
            config.embedding_timeout,
        )
        .context("Failed to build embedding HTTP client")?,
    );
    info!(
        "Embedding client initialized (model: {}, concurrency: {})",
        embeddings::MODEL,
        config.embedding_concurrency
    );

    let mut matcher = Matcher::new(embedder.clone(), config.embedding_concurrency);
    if config.precompute_embeddings {
        let index = CandidateIndex::build(
            embedder.as_ref(),
            dataset.records(),
            config.embedding_concurrency,
        )
        .await
        .context("Failed to precompute candidate embeddings")?;
        info!("Candidate index ready ({} vectors)", index.len());
        matcher = matcher.with_index(Arc::new(index));
    }

    // Build app state
    let state = AppState {
        dataset,
        matcher,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
