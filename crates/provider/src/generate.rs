//! Generation front-end: start an operation, poll it, and fold the
//! terminal outcome into the [`GenerationResult`] payload.
//!
//! Graceful failures (provider error, all candidates filtered) come back
//! as an `Ok` result carrying the embedded error marker, so the task
//! manager can record the job as completed while routing to the error
//! callback. Timeouts and transport failures come back as `Err` and fail
//! the job.

use std::sync::Arc;
use std::time::Instant;

use mediagen_core::generation::GenerationResult;
use mediagen_core::pricing::AssetKind;

use crate::operations::{OperationClient, ProviderError, StartRequest};
use crate::poller::{OperationPoller, TerminalOutcome};

/// Short status line for a successful generation of the given kind.
fn success_message(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Video => "Video generation successful.",
        AssetKind::Image => "Image generation successful.",
        AssetKind::Enrichment => "Image enrichment successful.",
    }
}

/// Short status line for a failed generation of the given kind.
fn failure_message(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Video => "Video generation failed.",
        AssetKind::Image => "Image generation failed.",
        AssetKind::Enrichment => "Image enrichment failed.",
    }
}

/// Run one generation to a terminal [`GenerationResult`].
pub async fn run_generation(
    client: Arc<dyn OperationClient>,
    poller: OperationPoller,
    request: StartRequest,
) -> Result<GenerationResult, ProviderError> {
    let started = Instant::now();
    let kind = request.asset_kind;

    let handle = client.start(&request).await?;
    tracing::info!(
        operation = %handle.name,
        model_id = %request.model_id,
        asset_kind = kind.as_str(),
        "Generation operation started",
    );

    match poller.run(client.as_ref(), &handle).await? {
        TerminalOutcome::Success(op) => {
            tracing::info!(
                operation = %handle.name,
                artifacts = op.artifacts.len(),
                "Generation operation completed",
            );
            Ok(GenerationResult {
                message: success_message(kind).to_string(),
                artifacts: op.artifacts,
                operation_secs: started.elapsed().as_secs_f64(),
                revised_prompt: op.revised_prompt,
                error: None,
                safety_reasons: Vec::new(),
                input_tokens: op.input_tokens,
                output_tokens: op.output_tokens,
            })
        }
        TerminalOutcome::GracefulFailure { message, reasons } => {
            tracing::warn!(
                operation = %handle.name,
                error = %message,
                reasons = reasons.len(),
                "Generation operation finished without usable output",
            );
            Ok(GenerationResult {
                message: failure_message(kind).to_string(),
                artifacts: Vec::new(),
                operation_secs: started.elapsed().as_secs_f64(),
                revised_prompt: None,
                error: Some(message),
                safety_reasons: reasons,
                input_tokens: None,
                output_tokens: None,
            })
        }
        TerminalOutcome::Timeout => Err(ProviderError::Timeout {
            secs: started.elapsed().as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use mediagen_core::generation::OutputArtifact;

    use super::*;
    use crate::operations::{OperationHandle, OperationStatus};

    struct OneShotClient {
        status: Mutex<Option<OperationStatus>>,
    }

    #[async_trait]
    impl OperationClient for OneShotClient {
        async fn start(&self, _request: &StartRequest) -> Result<OperationHandle, ProviderError> {
            Ok(OperationHandle {
                name: "operations/gen".to_string(),
            })
        }

        async fn poll(&self, _handle: &OperationHandle) -> Result<OperationStatus, ProviderError> {
            Ok(self.status.lock().unwrap().take().unwrap_or_default())
        }

        async fn cancel(&self, _handle: &OperationHandle) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn video_request() -> StartRequest {
        StartRequest {
            asset_kind: AssetKind::Video,
            model_id: "veo-3.0-generate-001".to_string(),
            prompt: "a red fox in the snow".to_string(),
            sample_count: 1,
            aspect_ratio: Some("16:9".to_string()),
            negative_prompt: None,
            image_size: None,
            duration_secs: Some(8),
            generate_audio: Some(true),
            resolution: Some("1080p".to_string()),
            first_frame_uri: None,
            last_frame_uri: None,
            source_image_uris: Vec::new(),
            output_prefix: Some("gs://outputs/test".to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_outcome_becomes_clean_result() {
        let client = Arc::new(OneShotClient {
            status: Mutex::new(Some(OperationStatus {
                done: true,
                artifacts: vec![OutputArtifact {
                    uri: "gs://out/a.mp4".to_string(),
                    resolution: Some("1920x1080".to_string()),
                }],
                revised_prompt: Some("a red fox bounding through fresh snow".to_string()),
                ..OperationStatus::default()
            })),
        });

        let poller = OperationPoller::new(Duration::from_secs(1), Duration::from_secs(10));
        let result = run_generation(client, poller, video_request()).await.unwrap();

        assert!(!result.is_graceful_failure());
        assert_eq!(result.message, "Video generation successful.");
        assert_eq!(result.artifacts.len(), 1);
        assert!(result.revised_prompt.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_failure_carries_embedded_error_and_reasons() {
        let client = Arc::new(OneShotClient {
            status: Mutex::new(Some(OperationStatus {
                done: true,
                error: Some("blocked: Support codes: 90789179".to_string()),
                ..OperationStatus::default()
            })),
        });

        let poller = OperationPoller::new(Duration::from_secs(1), Duration::from_secs(10));
        let result = run_generation(client, poller, video_request()).await.unwrap();

        assert!(result.is_graceful_failure());
        assert!(result.artifacts.is_empty());
        assert_eq!(result.safety_reasons.len(), 1);
        assert_eq!(result.safety_reasons[0].category, "Sexual");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_as_error() {
        // A client that never reports done.
        let client = Arc::new(OneShotClient {
            status: Mutex::new(None),
        });

        let poller = OperationPoller::new(Duration::from_secs(1), Duration::from_secs(3));
        let err = run_generation(client, poller, video_request())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Timeout { .. }));
    }
}
