//! Handlers for the `/videos` resource.

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

/// Default clip length in seconds.
const DEFAULT_DURATION_SECS: i32 = 8;

/// Request body for `POST /videos/generate`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateVideoRequest {
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,
    #[validate(length(min = 1))]
    pub model: String,
    /// Clip length in seconds.
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_duration")]
    pub duration: i32,
    #[validate(range(min = 1, max = 4))]
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub generate_audio: bool,
    /// Conditioning image for image-to-video.
    #[serde(default)]
    pub image_uri: Option<String>,
    /// Target last frame for interpolation.
    #[serde(default)]
    pub final_frame_uri: Option<String>,
    #[serde(default)]
    pub creative_project_id: Option<String>,
}

fn default_duration() -> i32 {
    DEFAULT_DURATION_SECS
}

fn default_sample_count() -> u32 {
    1
}

/// POST /api/v1/videos/generate
///
/// Validate, admission-check, and queue a video generation job. Returns
/// 202 with the job id; progress is visible via `GET /jobs/{id}`.
pub async fn generate_video(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Json(input): Json<GenerateVideoRequest>,
) -> crate::error::AppResult<impl IntoResponse> {
    let input = validated(input)?;
    tracing::info!(
        user_email = %caller.email,
        model_id = %input.model,
        "Received video generation request",
    );

    ensure_admitted(&state, &caller.email, input.creative_project_id.as_deref()).await?;

    let triggered_at = Utc::now();
    let output_prefix = format!(
        "gs://{}/video_outputs/{}/{}",
        state.config.output_bucket,
        caller.storage_folder(),
        uuid::Uuid::new_v4().simple(),
    );

    let request = StartRequest {
        asset_kind: AssetKind::Video,
        model_id: input.model.clone(),
        prompt: input.prompt.clone(),
        sample_count: input.sample_count,
        aspect_ratio: input.aspect_ratio.clone(),
        negative_prompt: None,
        image_size: None,
        duration_secs: Some(input.duration),
        generate_audio: Some(input.generate_audio),
        resolution: input.resolution.clone(),
        first_frame_uri: input.image_uri.clone(),
        last_frame_uri: input.final_frame_uri.clone(),
        source_image_uris: Vec::new(),
        output_prefix: Some(output_prefix),
    };

    let ctx = JobContext {
        caller: caller.email.clone(),
        project_id: input.creative_project_id.clone(),
        asset_kind: AssetKind::Video,
        model_id: input.model.clone(),
        prompt: Some(input.prompt.clone()),
        negative_prompt: None,
        video_duration_secs: Some(input.duration),
        with_audio: input.generate_audio,
        resolution: input.resolution.clone(),
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
    tracing::info!(job_id = %job_id, "Video generation job queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: SubmittedJob { job_id },
        }),
    ))
}
