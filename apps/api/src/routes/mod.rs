pub mod health;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;

use crate::ai::handlers as ai;
use crate::identity::require_user;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

/// Success body: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

pub fn data<T: Serialize>(value: T) -> Json<DataEnvelope<T>> {
    Json(DataEnvelope { data: value })
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/me", get(jobs::handle_get_me))
        .route("/me/cv", patch(jobs::handle_update_cv))
        // Job tracker
        .route("/jobs", get(jobs::handle_list_jobs).post(jobs::handle_create_job))
        .route("/jobs/stats", get(jobs::handle_job_stats))
        .route(
            "/jobs/:id",
            get(jobs::handle_get_job)
                .patch(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/jobs/:id/status", patch(jobs::handle_update_status))
        // AI
        .route("/ai/parse-job", post(ai::handle_parse_job))
        .route("/ai/scrape", post(ai::handle_scrape))
        .route("/ai/analyze/:job_id", post(ai::handle_analyze))
        .route("/ai/follow-up/:job_id", post(ai::handle_follow_up))
        .route_layer(from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .with_state(state)
}
