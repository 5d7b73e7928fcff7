//! In-memory job records and the concurrent job arena (PRD-03).
//!
//! Jobs live only in process memory: the store is an explicit arena
//! injected into the task manager (and into tests), keyed by job id.
//! Records are written by the owning worker and read concurrently by
//! status queries; each update replaces the whole record under the lock,
//! so a reader sees either the prior or the new value, never a partial
//! one. Records are never deleted; nothing survives a restart.

use std::collections::HashMap;

use mediagen_core::types::JobId;
use serde::Serialize;
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Queued, not yet picked up by a worker.
    Pending,
    /// Executing on a worker.
    Running,
    /// Work finished normally (including graceful failures).
    Completed,
    /// Work raised or timed out.
    Failed,
}

/// State reported by a status query; adds the explicit not-found case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobQueryState {
    NotFound,
    Pending,
    Running,
    Completed,
    Failed,
}

impl From<JobState> for JobQueryState {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Pending => JobQueryState::Pending,
            JobState::Running => JobQueryState::Running,
            JobState::Completed => JobQueryState::Completed,
            JobState::Failed => JobQueryState::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Records and views
// ---------------------------------------------------------------------------

/// One tracked job.
#[derive(Debug, Clone)]
struct JobRecord {
    state: JobState,
    result: Option<serde_json::Value>,
    error: Option<String>,
}

/// Snapshot returned to status queries. Unknown ids produce a
/// `not_found` view rather than an error.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub status: JobQueryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobView {
    fn not_found() -> Self {
        Self {
            status: JobQueryState::NotFound,
            result: None,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Concurrent job arena.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly submitted job.
    pub async fn insert_pending(&self, id: JobId) {
        self.jobs.write().await.insert(
            id,
            JobRecord {
                state: JobState::Pending,
                result: None,
                error: None,
            },
        );
    }

    /// Mark a job as picked up by a worker.
    pub async fn set_running(&self, id: JobId) {
        self.update(id, |record| record.state = JobState::Running)
            .await;
    }

    /// Record a completed job with its result payload.
    pub async fn complete(&self, id: JobId, result: serde_json::Value) {
        self.update(id, |record| {
            record.state = JobState::Completed;
            record.result = Some(result);
        })
        .await;
    }

    /// Record a failed job with its error message.
    pub async fn fail(&self, id: JobId, error: &str) {
        let error = error.to_string();
        self.update(id, |record| {
            record.state = JobState::Failed;
            record.error = Some(error);
        })
        .await;
    }

    /// Snapshot a job's current state. Repeated calls do not change
    /// anything; unknown ids yield a `not_found` view.
    pub async fn view(&self, id: JobId) -> JobView {
        match self.jobs.read().await.get(&id) {
            Some(record) => JobView {
                status: record.state.into(),
                result: record.result.clone(),
                error: record.error.clone(),
            },
            None => JobView::not_found(),
        }
    }

    async fn update(&self, id: JobId, apply: impl FnOnce(&mut JobRecord)) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(record) => apply(record),
            // Only reachable if a worker processes a job the submitter
            // never registered; log rather than panic.
            None => tracing::warn!(job_id = %id, "Update for unknown job id"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = JobStore::new();
        let view = store.view(Uuid::new_v4()).await;
        assert_eq!(view.status, JobQueryState::NotFound);
        assert!(view.result.is_none());
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn lifecycle_transitions_are_visible() {
        let store = JobStore::new();
        let id = Uuid::new_v4();

        store.insert_pending(id).await;
        assert_eq!(store.view(id).await.status, JobQueryState::Pending);

        store.set_running(id).await;
        assert_eq!(store.view(id).await.status, JobQueryState::Running);

        store.complete(id, serde_json::json!({"ok": true})).await;
        let view = store.view(id).await;
        assert_eq!(view.status, JobQueryState::Completed);
        assert_eq!(view.result.unwrap()["ok"], true);
    }

    #[tokio::test]
    async fn failure_records_error_message() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.insert_pending(id).await;
        store.fail(id, "provider unreachable").await;

        let view = store.view(id).await;
        assert_eq!(view.status, JobQueryState::Failed);
        assert_eq!(view.error.as_deref(), Some("provider unreachable"));
    }

    #[tokio::test]
    async fn view_is_idempotent() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.insert_pending(id).await;

        let first = store.view(id).await;
        let second = store.view(id).await;
        assert_eq!(first.status, second.status);
    }
}
