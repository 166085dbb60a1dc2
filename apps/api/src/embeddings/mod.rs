//! Embeddings: text-to-vector via a hosted feature-extraction model, plus cosine similarity.
//!
//! Similarity is an auxiliary signal: callers treat any failure here as "no score" rather
//! than failing the request that asked for it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Hugging Face inference endpoint for `sentence-transformers/all-MiniLM-L6-v2`.
pub const DEFAULT_EMBEDDING_URL: &str =
    "https://api-inference.huggingface.co/models/sentence-transformers/all-MiniLM-L6-v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed-length vector produced by the embedding model.
pub type EmbeddingVector = Vec<f64>;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding input must not be empty")]
    EmptyInput,

    #[error("embedding transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("embedding API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("embedding response is not a vector batch: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("embedding response contained no vectors")]
    EmptyBatch,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    inputs: &'a str,
}

#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HuggingFaceEmbedder {
    pub fn new(api_key: String, endpoint: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    /// Embeds `text` and returns the first vector of the returned batch.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { inputs: text })
            .send()
            .await
            .map_err(EmbeddingError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(EmbeddingError::Transport)?;

        if !status.is_success() {
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let batch: Vec<EmbeddingVector> =
            serde_json::from_str(&body).map_err(EmbeddingError::Decode)?;
        let vector = batch.into_iter().next().ok_or(EmbeddingError::EmptyBatch)?;

        debug!("Embedding received: {} dimensions", vector.len());
        Ok(vector)
    }
}

/// Cosine similarity of two vectors.
///
/// Returns exactly 0.0 when the dimensions differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
