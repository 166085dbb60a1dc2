// AI layer: structured extraction, gap analysis, follow-up drafting and the
// scrape → parse → merge pipeline. All LLM calls go through llm_client::ChatGateway.

pub mod follow_up;
pub mod gap_analysis;
pub mod handlers;
pub mod job_parser;
pub mod merge;
pub mod pipeline;
pub mod prompts;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::sanitize::strip_code_fences;
use crate::llm_client::{ChatGateway, LlmError};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("{0} must not be empty")]
    EmptySource(&'static str),

    #[error(transparent)]
    Gateway(#[from] LlmError),

    /// The model answered, but not with the JSON shape we asked for.
    #[error("AI response unparseable: {0}")]
    Unparseable(#[source] serde_json::Error),
}

/// Rejects blank input before any LLM call is made.
pub(crate) fn require_text(text: &str, what: &'static str) -> Result<(), AiError> {
    if text.trim().is_empty() {
        return Err(AiError::EmptySource(what));
    }
    Ok(())
}

/// One LLM call, fence-stripped and decoded into `T`. Exactly one attempt; a decode
/// failure discards the whole response.
pub(crate) async fn request_json<T: DeserializeOwned>(
    llm: &dyn ChatGateway,
    system: &str,
    user: &str,
) -> Result<T, AiError> {
    let raw = llm.chat(system, user).await?;
    serde_json::from_str(strip_code_fences(&raw)).map_err(|e| {
        warn!("Discarding unparseable AI response ({} chars): {e}", raw.len());
        AiError::Unparseable(e)
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::test_support::FakeGateway;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Flag {
        ok: bool,
    }

    #[tokio::test]
    async fn test_request_json_strips_fences() {
        let llm = FakeGateway::replying("```json\n{\"ok\": true}\n```");
        let flag: Flag = request_json(&llm, "system", "user").await.unwrap();
        assert_eq!(flag, Flag { ok: true });
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_json_prose_is_unparseable() {
        let llm = FakeGateway::replying("Sure! Here is the JSON you asked for.");
        let err = request_json::<Flag>(&llm, "system", "user").await.unwrap_err();
        assert!(matches!(err, AiError::Unparseable(_)));
        assert!(err.to_string().starts_with("AI response unparseable"));
    }

    #[tokio::test]
    async fn test_request_json_wrong_shape_is_unparseable() {
        let llm = FakeGateway::replying("{\"ok\": \"yes\"}");
        let err = request_json::<Flag>(&llm, "system", "user").await.unwrap_err();
        assert!(matches!(err, AiError::Unparseable(_)));
    }

    #[tokio::test]
    async fn test_request_json_gateway_error_passes_through() {
        let llm = FakeGateway::failing();
        let err = request_json::<Flag>(&llm, "system", "user").await.unwrap_err();
        assert!(matches!(err, AiError::Gateway(LlmError::Api { .. })));
    }
}
