use std::sync::Arc;

use crate::embeddings::Embedder;
use crate::identity::IdentityResolver;
use crate::jobs::store::JobStore;
use crate::llm_client::ChatGateway;
use crate::scrape::JobScraper;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every outbound capability is constructed once at startup and held behind a trait.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub identity: Arc<dyn IdentityResolver>,
    pub llm: Arc<dyn ChatGateway>,
    pub embedder: Arc<dyn Embedder>,
    pub scraper: Arc<dyn JobScraper>,
}
