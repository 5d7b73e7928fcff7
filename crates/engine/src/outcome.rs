//! Terminal outcome classification and completion callbacks (PRD-03).
//!
//! The worker wrapper decides an [`Outcome`] exactly once per job and
//! passes it whole to the matching callback: no error object is mutated
//! after the fact, and structured safety reasons travel with the failure
//! they belong to.

use async_trait::async_trait;
use mediagen_core::generation::GenerationResult;
use mediagen_core::pricing::AssetKind;
use mediagen_core::safety::SafetyReason;
use mediagen_core::types::Timestamp;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Request context threaded from submission through to the callbacks,
/// carrying everything the persistence side needs to write a usage-log
/// record.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Caller identity (email) the usage is attributed to.
    pub caller: String,
    /// Creative project the request was made under, if any.
    pub project_id: Option<String>,
    pub asset_kind: AssetKind,
    pub model_id: String,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    /// Requested clip length; video only.
    pub video_duration_secs: Option<i32>,
    /// Whether audio generation was requested; video only.
    pub with_audio: bool,
    pub resolution: Option<String>,
    pub aspect_ratio: Option<String>,
    /// When the request was accepted (usage is priced as of this time).
    pub triggered_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Failure payload handed to [`CompletionHooks::on_error`].
#[derive(Debug, Clone)]
pub struct GenerationFailure {
    /// Error message: the embedded graceful-failure text, the raised
    /// error's message, or the panic payload.
    pub message: String,
    /// Structured safety reasons, when the failure was a content-safety
    /// rejection. Empty otherwise.
    pub reasons: Vec<SafetyReason>,
}

/// The single classification of a finished job.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Work returned a clean payload.
    Success(GenerationResult),
    /// Work returned normally but the payload carries the embedded error
    /// marker: the job is recorded completed (with the full payload, so
    /// clients can render the rejection reasons), yet the error callback
    /// fires.
    GracefulFailure {
        result: GenerationResult,
        failure: GenerationFailure,
    },
    /// Work raised or panicked; the job is recorded failed.
    Exception(GenerationFailure),
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Error returned by a callback. Logged by the worker and swallowed: a
/// callback failure never changes the already-recorded job status.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

/// Persistence callbacks invoked after a job reaches its terminal state.
///
/// Exactly one of the two methods runs per job, exactly once. The
/// implementations are expected to write a usage-log record and
/// optionally register the produced assets.
#[async_trait]
pub trait CompletionHooks: Send + Sync {
    async fn on_success(
        &self,
        result: &GenerationResult,
        ctx: &JobContext,
    ) -> Result<(), CallbackError>;

    async fn on_error(
        &self,
        failure: &GenerationFailure,
        ctx: &JobContext,
    ) -> Result<(), CallbackError>;
}
