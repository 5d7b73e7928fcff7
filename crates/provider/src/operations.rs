//! Long-running operation abstraction for the generation provider.

use async_trait::async_trait;
use mediagen_core::generation::OutputArtifact;
use mediagen_core::pricing::AssetKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Parameters for starting a generation operation.
///
/// One struct covers all asset kinds; fields irrelevant to a kind stay
/// `None` and are skipped on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub asset_kind: AssetKind,
    pub model_id: String,
    pub prompt: String,
    pub sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Image generation only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    /// Video generation only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// First/last frame conditioning images for video.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_frame_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_frame_uri: Option<String>,
    /// Source images for enrichment.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub source_image_uris: Vec<String>,
    /// Object-storage prefix the provider writes artifacts under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_prefix: Option<String>,
}

// ---------------------------------------------------------------------------
// Handles and status
// ---------------------------------------------------------------------------

/// Server-assigned handle for a started operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperationHandle {
    /// Operation resource name, e.g. `"operations/op-9f41"`.
    pub name: String,
}

/// A snapshot of a long-running operation.
///
/// `done == false` means still executing and every other field is
/// meaningless. On `done`, either `error` is set, or the artifact list
/// holds the outputs (possibly empty when everything was safety-filtered,
/// in which case `filtered_reasons` explains why).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationStatus {
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<OutputArtifact>,
    /// Raw per-candidate rejection strings attached by the provider when
    /// outputs were filtered.
    #[serde(default)]
    pub filtered_reasons: Vec<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
    #[serde(default)]
    pub input_tokens: Option<i64>,
    #[serde(default)]
    pub output_tokens: Option<i64>,
}

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// Errors from the provider client layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The operation did not reach a terminal state within the polling
    /// ceiling. Fatal for the job; not retried.
    #[error("Polling timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Start/poll/cancel access to the provider's operations API.
///
/// The poller and the generation front-end only depend on this trait, so
/// tests can drive them with scripted fakes.
#[async_trait]
pub trait OperationClient: Send + Sync {
    /// Issue the generation call; returns the operation handle.
    async fn start(&self, request: &StartRequest) -> Result<OperationHandle, ProviderError>;

    /// Fetch the operation's current status.
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, ProviderError>;

    /// Ask the provider to abandon the operation. Best-effort; used when
    /// the poller gives up on a timed-out operation.
    async fn cancel(&self, handle: &OperationHandle) -> Result<(), ProviderError>;
}
