//! Handlers for the `/images` resource: direct generation and
//! multi-image enrichment.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use mediagen_core::pricing::AssetKind;
use mediagen_engine::manager::JobFuture;
use mediagen_engine::JobContext;
use mediagen_provider::generate::run_generation;
use mediagen_provider::StartRequest;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::handlers::{ensure_admitted, validated, SubmittedJob};
use crate::identity::CallerIdentity;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /images/generate`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateImageRequest {
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[validate(range(min = 1, max = 4))]
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,
    /// Target output size, e.g. `"1K"` or `"2K"`.
    #[serde(default)]
    pub image_size: Option<String>,
    #[serde(default)]
    pub creative_project_id: Option<String>,
}

fn default_sample_count() -> u32 {
    1
}

/// Request body for `POST /images/enrich`.
///
/// Enrichment rewrites one or more existing images under an instruction
/// prompt; sources are referenced by storage URI (uploading is the
/// storage service's concern).
#[derive(Debug, Deserialize, Validate)]
pub struct EnrichImageRequest {
    /// Instruction prompt; may be empty when the sources speak for
    /// themselves (e.g. plain combination requests).
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub prompt: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[serde(default = "default_enrich_aspect_ratio")]
    pub aspect_ratio: String,
    /// At most three source images per request.
    #[validate(length(min = 1, max = 3))]
    pub source_image_uris: Vec<String>,
    #[serde(default)]
    pub creative_project_id: Option<String>,
}

fn default_enrich_aspect_ratio() -> String {
    "1:1".to_string()
}

/// POST /api/v1/images/generate
pub async fn generate_image(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Json(input): Json<GenerateImageRequest>,
) -> crate::error::AppResult<impl IntoResponse> {
    let input = validated(input)?;
    tracing::info!(
        user_email = %caller.email,
        model_id = %input.model,
        "Received image generation request",
    );

    ensure_admitted(&state, &caller.email, input.creative_project_id.as_deref()).await?;

    let triggered_at = Utc::now();
    let output_prefix = format!(
        "gs://{}/image_outputs/{}/{}",
        state.config.output_bucket,
        caller.storage_folder(),
        uuid::Uuid::new_v4().simple(),
    );

    let request = StartRequest {
        asset_kind: AssetKind::Image,
        model_id: input.model.clone(),
        prompt: input.prompt.clone(),
        sample_count: input.sample_count,
        aspect_ratio: input.aspect_ratio.clone(),
        negative_prompt: input.negative_prompt.clone(),
        image_size: input.image_size.clone(),
        duration_secs: None,
        generate_audio: None,
        resolution: None,
        first_frame_uri: None,
        last_frame_uri: None,
        source_image_uris: Vec::new(),
        output_prefix: Some(output_prefix),
    };

    let ctx = JobContext {
        caller: caller.email.clone(),
        project_id: input.creative_project_id.clone(),
        asset_kind: AssetKind::Image,
        model_id: input.model.clone(),
        prompt: Some(input.prompt.clone()),
        negative_prompt: input.negative_prompt.clone(),
        video_duration_secs: None,
        with_audio: false,
        resolution: input.image_size.clone(),
        aspect_ratio: input.aspect_ratio.clone(),
        triggered_at,
    };

    let provider = Arc::clone(&state.provider);
    let poller = state.poller;
    let work: JobFuture = Box::pin(async move {
        run_generation(provider, poller, request)
            .await
            .map_err(Into::into)
    });

    let job_id = state
        .task_manager
        .submit(work, state.recorder.clone(), ctx)
        .await;
    tracing::info!(job_id = %job_id, "Image generation job queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: SubmittedJob { job_id },
        }),
    ))
}

/// POST /api/v1/images/enrich
pub async fn enrich_image(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Json(input): Json<EnrichImageRequest>,
) -> crate::error::AppResult<impl IntoResponse> {
    let input = validated(input)?;
    tracing::info!(
        user_email = %caller.email,
        model_id = %input.model,
        sources = input.source_image_uris.len(),
        "Received image enrichment request",
    );

    ensure_admitted(&state, &caller.email, input.creative_project_id.as_deref()).await?;

    let triggered_at = Utc::now();
    let output_prefix = format!(
        "gs://{}/image_outputs/{}/{}",
        state.config.output_bucket,
        caller.storage_folder(),
        uuid::Uuid::new_v4().simple(),
    );

    let request = StartRequest {
        asset_kind: AssetKind::Enrichment,
        model_id: input.model.clone(),
        prompt: input.prompt.clone(),
        sample_count: 1,
        aspect_ratio: Some(input.aspect_ratio.clone()),
        negative_prompt: None,
        image_size: None,
        duration_secs: None,
        generate_audio: None,
        resolution: None,
        first_frame_uri: None,
        last_frame_uri: None,
        source_image_uris: input.source_image_uris.clone(),
        output_prefix: Some(output_prefix),
    };

    let ctx = JobContext {
        caller: caller.email.clone(),
        project_id: input.creative_project_id.clone(),
        asset_kind: AssetKind::Enrichment,
        model_id: input.model.clone(),
        prompt: Some(input.prompt.clone()),
        negative_prompt: None,
        video_duration_secs: None,
        with_audio: false,
        resolution: None,
        aspect_ratio: Some(input.aspect_ratio.clone()),
        triggered_at,
    };

    let provider = Arc::clone(&state.provider);
    let poller = state.poller;
    let work: JobFuture = Box::pin(async move {
        run_generation(provider, poller, request)
            .await
            .map_err(Into::into)
    });

    let job_id = state
        .task_manager
        .submit(work, state.recorder.clone(), ctx)
        .await;
    tracing::info!(job_id = %job_id, "Image enrichment job queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: SubmittedJob { job_id },
        }),
    ))
}
