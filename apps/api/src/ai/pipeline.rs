//! Pipelines: the two multi-step AI flows.
//!
//! Ingestion: URL → scrape → LLM extraction → merge. The LLM is only called once the
//! scrape has completed with usable text.
//!
//! Fit analysis: gap analysis (LLM) and embedding similarity run concurrently. The
//! similarity score is best-effort; the LLM result is not.

use tracing::{info, warn};

use crate::ai::gap_analysis::{analyze_gap, GapAnalysis};
use crate::ai::job_parser::{parse_job_description, ParsedJob};
use crate::ai::merge::merge_scraped;
use crate::ai::{require_text, AiError};
use crate::embeddings::{cosine_similarity, Embedder};
use crate::errors::AppError;
use crate::llm_client::ChatGateway;
use crate::scrape::JobScraper;

/// Gap analysis plus the optional embedding similarity of the same two texts.
#[derive(Debug, Clone)]
pub struct FitAssessment {
    pub analysis: GapAnalysis,
    pub similarity: Option<f64>,
}

/// Scrapes `url` and turns the page into a merged `ParsedJob`.
pub async fn scrape_and_parse(
    scraper: &dyn JobScraper,
    llm: &dyn ChatGateway,
    url: &str,
) -> Result<ParsedJob, AppError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url is required".to_string()));
    }

    let scraped = scraper.scrape(url).await?;
    if scraped.raw_text.trim().is_empty() {
        warn!("No content scraped from {url}; skipping AI parsing");
        return Err(AppError::EmptyScrape(url.to_string()));
    }

    let parsed = parse_job_description(llm, &scraped.raw_text).await?;
    let merged = merge_scraped(&scraped, parsed);

    info!(
        "Parsed job from {url}: platform={}, title={:?}",
        merged.platform, merged.title
    );
    Ok(merged)
}

/// Runs gap analysis and similarity scoring side by side.
///
/// Fails only when the gap analysis fails; a similarity failure yields `similarity: None`.
/// If the analysis fails first, the in-flight embedding calls are dropped.
pub async fn analyze_fit(
    llm: &dyn ChatGateway,
    embedder: &dyn Embedder,
    cv_text: &str,
    requirements: &str,
) -> Result<FitAssessment, AiError> {
    require_text(cv_text, "CV text")?;
    require_text(requirements, "job requirements")?;

    let (analysis, similarity) = tokio::try_join!(
        analyze_gap(llm, cv_text, requirements),
        async { Ok::<_, AiError>(score_similarity(embedder, cv_text, requirements).await) },
    )?;

    Ok(FitAssessment {
        analysis,
        similarity,
    })
}

/// Cosine similarity of the two texts' embeddings, or `None` if either embedding fails.
pub async fn score_similarity(embedder: &dyn Embedder, left: &str, right: &str) -> Option<f64> {
    match tokio::try_join!(embedder.embed(left), embedder.embed(right)) {
        Ok((a, b)) => Some(cosine_similarity(&a, &b)),
        Err(e) => {
            warn!("Similarity unavailable, continuing without it: {e}");
            None
        }
    }
}
