use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai::AiError;
use crate::scrape::ScrapeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No content scraped from {0}")]
    EmptyScrape(String),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid Authorization header".to_string(),
            ),
            AppError::EmptyScrape(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_SCRAPE",
                "No content scraped from URL".to_string(),
            ),
            AppError::Scrape(ScrapeError::InvalidUrl { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            AppError::Scrape(e) => {
                tracing::warn!("Scrape error: {e}");
                (StatusCode::BAD_GATEWAY, "SCRAPE_ERROR", e.to_string())
            }
            AppError::Ai(AiError::EmptySource(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            AppError::Ai(AiError::Unparseable(e)) => {
                tracing::error!("AI response unparseable: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_UNPARSEABLE",
                    "The AI service returned a response that could not be parsed".to_string(),
                )
            }
            AppError::Ai(AiError::Gateway(e)) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
