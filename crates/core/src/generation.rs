//! Shared generation result payloads.
//!
//! A generation work function resolves to a [`GenerationResult`] whether
//! or not the provider produced usable output: a provider-side rejection
//! that did not raise is a "graceful failure" and is signalled by the
//! embedded [`error`](GenerationResult::error) field, with any structured
//! safety reasons attached.

use serde::{Deserialize, Serialize};

use crate::safety::SafetyReason;

/// One produced output (video or image) by storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Object-storage URI of the artifact.
    pub uri: String,
    /// Pixel resolution, e.g. `"1280x720"`, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// Terminal payload of a generation work function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Short status message, e.g. `"Video generation successful."`.
    pub message: String,
    /// Produced artifacts; empty on graceful failure.
    pub artifacts: Vec<OutputArtifact>,
    /// Wall-clock seconds the provider operation ran.
    pub operation_secs: f64,
    /// Prompt as rewritten by the provider, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    /// Embedded graceful-failure marker: set when the provider call
    /// returned normally but produced no usable output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured safety-rejection reasons, when the provider signalled
    /// any. Empty means "not a safety rejection".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_reasons: Vec<SafetyReason>,
    /// Token usage for token-priced (enrichment) models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<i64>,
}

impl GenerationResult {
    /// Whether this payload carries the embedded graceful-failure marker.
    pub fn is_graceful_failure(&self) -> bool {
        self.error.is_some()
    }
}
