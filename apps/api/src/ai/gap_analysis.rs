//! Gap Analysis: CV vs job requirements, judged by the LLM.

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::ai::prompts::{GAP_ANALYSIS_PROMPT_TEMPLATE, GAP_ANALYSIS_ROLE};
use crate::ai::{request_json, require_text, AiError};
use crate::llm_client::prompts::{fill_template, json_system_prompt};
use crate::llm_client::ChatGateway;

/// Qualitative and quantitative fit assessment. The model is asked for three strengths
/// and three gaps; whatever it returns is kept in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    #[serde(deserialize_with = "percentage")]
    pub match_percentage: u8,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub suggestion: String,
    pub verdict: String,
}

/// 0–100 inclusive; anything else makes the whole response unparseable.
fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = u64::deserialize(deserializer)?;
    if value > 100 {
        return Err(de::Error::custom(format!(
            "match_percentage {value} is outside 0-100"
        )));
    }
    Ok(value as u8)
}

/// Compares a CV against a job's requirements with one LLM call.
pub async fn analyze_gap(
    llm: &dyn ChatGateway,
    cv_text: &str,
    requirements: &str,
) -> Result<GapAnalysis, AiError> {
    require_text(cv_text, "CV text")?;
    require_text(requirements, "job requirements")?;

    let system = json_system_prompt(GAP_ANALYSIS_ROLE);
    let prompt = fill_template(
        GAP_ANALYSIS_PROMPT_TEMPLATE,
        &[("cv_text", cv_text), ("requirements", requirements)],
    );
    request_json(llm, &system, &prompt).await
}
