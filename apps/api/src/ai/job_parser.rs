//! Job Parser: turns raw posting text into a structured `ParsedJob`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::ai::prompts::{JOB_PARSE_PROMPT_TEMPLATE, JOB_PARSE_ROLE};
use crate::ai::{request_json, require_text, AiError};
use crate::llm_client::prompts::{fill_template, json_system_prompt};
use crate::llm_client::ChatGateway;

/// Structured job record as inferred by the model.
///
/// Text fields the model could not determine come back as empty strings (a JSON `null`
/// is read the same way). Salaries stay `None` when undetermined; they are never zeroed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedJob {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirements: String,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub platform: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses posting text with one LLM call. Blank input is rejected before the call.
pub async fn parse_job_description(
    llm: &dyn ChatGateway,
    raw_text: &str,
) -> Result<ParsedJob, AiError> {
    require_text(raw_text, "job posting text")?;

    let system = json_system_prompt(JOB_PARSE_ROLE);
    let prompt = fill_template(JOB_PARSE_PROMPT_TEMPLATE, &[("raw_text", raw_text)]);
    request_json(llm, &system, &prompt).await
}
