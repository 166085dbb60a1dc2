mod ai;
mod config;
mod db;
mod embeddings;
mod errors;
mod identity;
mod jobs;
mod llm_client;
mod routes;
mod scrape;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::embeddings::HuggingFaceEmbedder;
use crate::jobs::store::PgStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scrape::HttpScraper;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lamarr API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize outbound clients
    let llm = LlmClient::new(config.groq_api_key.clone(), &config.groq_base_url)
        .context("building LLM client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let embedder =
        HuggingFaceEmbedder::new(config.huggingface_api_key.clone(), config.embedding_url.clone())
            .context("building embedding client")?;
    let scraper = HttpScraper::new().context("building scrape client")?;

    // Build app state
    let state = AppState {
        store: store.clone(),
        identity: store,
        llm: Arc::new(llm),
        embedder: Arc::new(embedder),
        scraper: Arc::new(scraper),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS for the configured frontend origins; unparseable origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
