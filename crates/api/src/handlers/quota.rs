//! Handlers for quota configuration (PRD-11).
//!
//! Cost managers adjust the global quota and per-project overrides here;
//! the admission check reads whatever is stored at request time.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use mediagen_core::error::CoreError;
use mediagen_core::quota::{ProjectQuotaConfig, QuotaSettings};
use mediagen_db::repositories::QuotaConfigRepo;
use mediagen_engine::AdmissionDecision;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::identity::CallerIdentity;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /quota/projects/{project_id}`.
#[derive(Debug, Deserialize)]
pub struct ProjectQuotaBody {
    #[serde(default)]
    pub unrestricted: bool,
    pub quota: QuotaSettings,
}

/// Query parameters for `GET /quota/check`.
#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Response body for `GET /quota/check`.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub exceeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/v1/quota/check
///
/// Run the admission check the generation endpoints apply, without
/// submitting anything. Lets clients surface "you are over quota"
/// before the user fills in a request.
pub async fn check(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> AppResult<impl IntoResponse> {
    let global = QuotaConfigRepo::global(&state.pool).await?;
    let project = match query.project_id.as_deref() {
        Some(id) => QuotaConfigRepo::for_project(&state.pool, id).await?,
        None => None,
    };

    let decision = state
        .admission
        .check(&caller.email, &global, project.as_ref())
        .await?;

    let body = match decision {
        AdmissionDecision::Admitted => CheckResponse {
            exceeded: false,
            message: None,
        },
        AdmissionDecision::Rejected { message } => CheckResponse {
            exceeded: true,
            message: Some(message),
        },
    };
    Ok(Json(DataResponse { data: body }))
}

/// GET /api/v1/quota/settings
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = QuotaConfigRepo::global(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/quota/settings
///
/// Replace the global quota configuration. Limited quotas must carry a
/// positive threshold.
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<QuotaSettings>,
) -> AppResult<impl IntoResponse> {
    settings.validate()?;
    QuotaConfigRepo::save_global(&state.pool, &settings).await?;

    tracing::info!(?settings, "Global quota settings updated");
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/v1/quota/projects/{project_id}
pub async fn get_project_config(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let config = QuotaConfigRepo::for_project(&state.pool, &project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project quota config",
            id: project_id,
        }))?;
    Ok(Json(DataResponse { data: config }))
}

/// PUT /api/v1/quota/projects/{project_id}
pub async fn put_project_config(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<ProjectQuotaBody>,
) -> AppResult<impl IntoResponse> {
    body.quota.validate()?;

    let config = ProjectQuotaConfig {
        project_id: project_id.clone(),
        unrestricted: body.unrestricted,
        quota: body.quota,
    };
    QuotaConfigRepo::save_project(&state.pool, &config).await?;

    tracing::info!(%project_id, unrestricted = config.unrestricted, "Project quota updated");
    Ok(Json(DataResponse { data: config }))
}
