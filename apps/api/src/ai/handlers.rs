use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::follow_up::{compose_follow_up, days_since, FollowUpRequest};
use crate::ai::gap_analysis::GapAnalysis;
use crate::ai::job_parser::{parse_job_description, ParsedJob};
use crate::ai::pipeline::{analyze_fit, scrape_and_parse};
use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::routes::{data, DataEnvelope};
use crate::state::AppState;

/// A missing field reads as blank so it is rejected by the same validation as `""`.
#[derive(Debug, Deserialize)]
pub struct ParseJobRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FollowUpEmail {
    pub email: String,
}

/// POST /api/ai/parse-job
pub async fn handle_parse_job(
    State(state): State<AppState>,
    Json(req): Json<ParseJobRequest>,
) -> Result<Json<DataEnvelope<ParsedJob>>, AppError> {
    let parsed = parse_job_description(state.llm.as_ref(), &req.text).await?;
    Ok(data(parsed))
}

/// POST /api/ai/scrape
pub async fn handle_scrape(
    State(state): State<AppState>,
    Json(req): Json<ScrapeRequest>,
) -> Result<Json<DataEnvelope<ParsedJob>>, AppError> {
    let parsed = scrape_and_parse(state.scraper.as_ref(), state.llm.as_ref(), &req.url).await?;
    Ok(data(parsed))
}

/// POST /api/ai/analyze/:job_id
///
/// Responds with the gap analysis only. The similarity score is persisted as the job's
/// match score when it is available; failing to store it does not fail the request.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<DataEnvelope<GapAnalysis>>, AppError> {
    let job = state
        .store
        .get_job(user.id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let cv_text = user.cv_text.as_deref().unwrap_or_default();
    if cv_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Please upload your CV text first".to_string(),
        ));
    }
    if job.requirements.trim().is_empty() {
        return Err(AppError::Validation(
            "Job has no requirements to analyze".to_string(),
        ));
    }

    let fit = analyze_fit(
        state.llm.as_ref(),
        state.embedder.as_ref(),
        cv_text,
        &job.requirements,
    )
    .await?;

    if let Some(score) = fit.similarity {
        match state.store.update_match_score(user.id, job.id, score).await {
            Ok(()) => info!("Stored match score {score:.3} for job {}", job.id),
            Err(e) => warn!("Failed to store match score for job {}: {e}", job.id),
        }
    }

    Ok(data(fit.analysis))
}

/// POST /api/ai/follow-up/:job_id
pub async fn handle_follow_up(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<DataEnvelope<FollowUpEmail>>, AppError> {
    let job = state
        .store
        .get_job(user.id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let request = FollowUpRequest {
        applicant_name: user.name.as_deref(),
        contact: &user.email,
        role_title: &job.title,
        organization: &job.company,
        days_since_applied: days_since(job.applied_at, Utc::now()),
    };
    let email = compose_follow_up(state.llm.as_ref(), &request).await?;

    Ok(data(FollowUpEmail { email }))
}
