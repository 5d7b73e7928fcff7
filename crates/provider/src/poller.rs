//! Bounded polling loop for generation operations (PRD-21).
//!
//! Drives one operation to a terminal outcome: poll on a fixed interval
//! until the handle reports done or the elapsed time passes the ceiling.
//! A timed-out operation is cancelled best-effort and reported as
//! [`TerminalOutcome::Timeout`] -- fatal for the job, never retried.
//!
//! The loop occupies its calling worker for the operation's lifetime;
//! the worker pool size bounds how many operations are in flight.

use std::time::Duration;

use mediagen_core::generation::OutputArtifact;
use mediagen_core::safety::{classify_rejection, SafetyReason};

use crate::operations::{OperationClient, OperationHandle, OperationStatus, ProviderError};

/// Fixed delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Maximum time an operation may stay non-terminal before it is abandoned.
pub const DEFAULT_POLL_CEILING: Duration = Duration::from_secs(600);

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Extracted payload of a successfully completed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedOperation {
    pub artifacts: Vec<OutputArtifact>,
    pub revised_prompt: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
}

/// Terminal state of a polled operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalOutcome {
    /// The operation produced at least one artifact.
    Success(CompletedOperation),
    /// The operation finished without usable output: a provider-side
    /// error, or every candidate was safety-filtered.
    GracefulFailure {
        message: String,
        reasons: Vec<SafetyReason>,
    },
    /// The ceiling elapsed before the operation reached a terminal state.
    Timeout,
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Polls a single operation to completion or timeout.
#[derive(Debug, Clone, Copy)]
pub struct OperationPoller {
    interval: Duration,
    ceiling: Duration,
}

impl Default for OperationPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_CEILING)
    }
}

impl OperationPoller {
    pub fn new(interval: Duration, ceiling: Duration) -> Self {
        Self { interval, ceiling }
    }

    /// Drive the operation behind `handle` to a terminal outcome.
    ///
    /// Returns `Err` only for transport-level failures from `poll`; every
    /// provider-reported condition (including timeout) is a
    /// [`TerminalOutcome`].
    pub async fn run(
        &self,
        client: &dyn OperationClient,
        handle: &OperationHandle,
    ) -> Result<TerminalOutcome, ProviderError> {
        let started = tokio::time::Instant::now();

        loop {
            if started.elapsed() >= self.ceiling {
                tracing::error!(
                    operation = %handle.name,
                    ceiling_secs = self.ceiling.as_secs(),
                    "Operation did not finish within the polling ceiling",
                );
                if let Err(e) = client.cancel(handle).await {
                    tracing::warn!(
                        operation = %handle.name,
                        error = %e,
                        "Failed to cancel timed-out operation",
                    );
                }
                return Ok(TerminalOutcome::Timeout);
            }

            tokio::time::sleep(self.interval).await;

            let status = client.poll(handle).await?;
            if status.done {
                return Ok(classify(status));
            }

            tracing::debug!(
                operation = %handle.name,
                elapsed_secs = started.elapsed().as_secs(),
                "Operation still running",
            );
        }
    }
}

/// Fold a terminal [`OperationStatus`] into an outcome.
///
/// A reported error or an empty artifact set are both graceful failures;
/// any embedded support codes (in the error text or the per-candidate
/// filter strings) become structured reasons.
fn classify(status: OperationStatus) -> TerminalOutcome {
    if let Some(error) = status.error {
        let reasons = classify_rejection(&error);
        return TerminalOutcome::GracefulFailure {
            message: error,
            reasons,
        };
    }

    if status.artifacts.is_empty() {
        let mut reasons = Vec::new();
        for raw in &status.filtered_reasons {
            let parsed = classify_rejection(raw);
            if parsed.is_empty() {
                // No support code embedded; surface the raw string so the
                // caller still sees why the candidate was dropped.
                reasons.push(SafetyReason {
                    code: "Unknown".to_string(),
                    category: "Unknown".to_string(),
                    description: raw.clone(),
                    filtered: "N/A".to_string(),
                });
            } else {
                reasons.extend(parsed);
            }
        }
        return TerminalOutcome::GracefulFailure {
            message: "Operation finished but produced no output.".to_string(),
            reasons,
        };
    }

    TerminalOutcome::Success(CompletedOperation {
        artifacts: status.artifacts,
        revised_prompt: status.revised_prompt,
        input_tokens: status.input_tokens,
        output_tokens: status.output_tokens,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
