//! Request handlers, one module per resource.

pub mod images;
pub mod jobs;
pub mod quota;
pub mod tariffs;
pub mod usage;
pub mod videos;

use mediagen_core::error::CoreError;
use mediagen_core::types::JobId;
use mediagen_db::repositories::QuotaConfigRepo;
use mediagen_engine::AdmissionDecision;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response body for accepted generation requests.
#[derive(Debug, Serialize)]
pub struct SubmittedJob {
    pub job_id: JobId,
}

/// Run a request DTO through its `validator` rules.
pub(crate) fn validated<T: Validate>(input: T) -> AppResult<T> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(input)
}

/// Run the quota admission check for a request; a rejection becomes a
/// resource-exhausted error before any job is created.
pub(crate) async fn ensure_admitted(
    state: &AppState,
    caller: &str,
    project_id: Option<&str>,
) -> AppResult<()> {
    let global = QuotaConfigRepo::global(&state.pool).await?;
    let project = match project_id {
        Some(id) => QuotaConfigRepo::for_project(&state.pool, id).await?,
        None => None,
    };

    match state
        .admission
        .check(caller, &global, project.as_ref())
        .await?
    {
        AdmissionDecision::Admitted => Ok(()),
        AdmissionDecision::Rejected { message } => {
            tracing::warn!(caller, %message, "Generation request rejected by quota");
            Err(AppError::Core(CoreError::QuotaExceeded(message)))
        }
    }
}
