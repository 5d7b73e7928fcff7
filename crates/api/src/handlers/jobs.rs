//! Handlers for the `/jobs` resource.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use mediagen_core::types::JobId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/jobs/{id}
///
/// Snapshot a job's status. Unknown ids return a normal body with
/// `status: "not_found"` rather than a 404; the id space is opaque and
/// in-memory, so absence is an answer, not an error.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    let view = state.task_manager.status(job_id).await;
    Ok(Json(DataResponse { data: view }))
}
