//! Follow-up Composer: drafts a time-aware follow-up email. Output is returned verbatim.

use chrono::{DateTime, Utc};

use crate::ai::prompts::{FOLLOW_UP_PROMPT_TEMPLATE, FOLLOW_UP_SYSTEM};
use crate::ai::{require_text, AiError};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::ChatGateway;

#[derive(Debug, Clone)]
pub struct FollowUpRequest<'a> {
    /// Display name; blank or missing falls back to `contact`.
    pub applicant_name: Option<&'a str>,
    pub contact: &'a str,
    pub role_title: &'a str,
    pub organization: &'a str,
    pub days_since_applied: i64,
}

impl FollowUpRequest<'_> {
    pub fn applicant(&self) -> &str {
        self.applicant_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.contact)
    }
}

/// Whole days between `applied_at` and `now`, never negative.
pub fn days_since(applied_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - applied_at).num_days().max(0)
}

pub async fn compose_follow_up(
    llm: &dyn ChatGateway,
    request: &FollowUpRequest<'_>,
) -> Result<String, AiError> {
    require_text(request.applicant(), "applicant name or contact")?;

    let days = request.days_since_applied.to_string();
    let prompt = fill_template(
        FOLLOW_UP_PROMPT_TEMPLATE,
        &[
            ("applicant", request.applicant()),
            ("role", request.role_title),
            ("company", request.organization),
            ("days", days.as_str()),
        ],
    );

    Ok(llm.chat(FOLLOW_UP_SYSTEM, &prompt).await?)
}
