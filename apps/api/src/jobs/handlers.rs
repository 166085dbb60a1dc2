use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::jobs::models::{
    JobDetail, JobFilter, JobPage, JobRow, JobStats, JobStatus, JobUpdate, NewJob, UserRow,
};
use crate::routes::{data, DataEnvelope};
use crate::state::AppState;

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

fn require_field(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<JobPage>, AppError> {
    let page = state.store.list_jobs(user.id, &filter).await?;
    Ok(Json(page))
}

/// GET /api/jobs/stats
pub async fn handle_job_stats(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<JobStats>, AppError> {
    Ok(Json(state.store.stats(user.id).await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataEnvelope<JobDetail>>, AppError> {
    let detail = state
        .store
        .get_job_detail(user.id, id)
        .await?
        .ok_or_else(job_not_found)?;
    Ok(data(detail))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(job): Json<NewJob>,
) -> Result<(StatusCode, Json<DataEnvelope<JobRow>>), AppError> {
    require_field(&job.title, "title")?;
    require_field(&job.company, "company")?;

    let row = state.store.create_job(user.id, job).await?;
    Ok((StatusCode::CREATED, data(row)))
}

/// PATCH /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<JobUpdate>,
) -> Result<Json<DataEnvelope<JobRow>>, AppError> {
    if let Some(title) = &update.title {
        require_field(title, "title")?;
    }
    if let Some(company) = &update.company {
        require_field(company, "company")?;
    }

    let row = state
        .store
        .update_job(user.id, id, update)
        .await?
        .ok_or_else(job_not_found)?;
    Ok(data(row))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: JobStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// PATCH /api/jobs/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> Result<Json<DataEnvelope<JobRow>>, AppError> {
    let row = state
        .store
        .update_status(user.id, id, change.status, change.note)
        .await?
        .ok_or_else(job_not_found)?;
    Ok(data(row))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_job(user.id, id).await? {
        return Err(job_not_found());
    }
    Ok(Json(json!({ "message": "Job deleted" })))
}

/// GET /api/me
pub async fn handle_get_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<DataEnvelope<UserRow>> {
    data(user)
}

#[derive(Debug, Deserialize)]
pub struct CvUpdate {
    pub cv_text: String,
}

/// PATCH /api/me/cv
pub async fn handle_update_cv(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CvUpdate>,
) -> Result<Json<DataEnvelope<UserRow>>, AppError> {
    require_field(&req.cv_text, "cv_text")?;
    state.store.update_cv(user.id, &req.cv_text).await?;

    let updated = state
        .store
        .get_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(data(updated))
}
