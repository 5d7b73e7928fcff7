//! Bounded asynchronous task manager (PRD-03).
//!
//! Submitted work runs on a fixed pool of long-lived workers; the
//! submitting request path never blocks on execution. Each job's outcome
//! is classified once at the worker boundary and reported through exactly
//! one callback, strictly after the terminal state is recorded in the job
//! arena. Nothing a job does (error, panic, or a failing callback) can
//! take a worker down.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use mediagen_core::safety::classify_rejection;
use mediagen_core::types::JobId;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::job::{JobStore, JobView};
use crate::outcome::{CompletionHooks, GenerationFailure, JobContext, Outcome};

/// Default number of pool workers, bounding concurrently in-flight
/// generations. Excess submissions queue.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Errors a work future may resolve to.
pub type JobError = Box<dyn std::error::Error + Send + Sync>;

/// A unit of generation work: a boxed future resolving to the structured
/// generation payload or an error.
pub type JobFuture =
    Pin<Box<dyn Future<Output = Result<mediagen_core::generation::GenerationResult, JobError>> + Send>>;

/// A job waiting in the queue.
struct QueuedJob {
    id: JobId,
    work: JobFuture,
    hooks: Arc<dyn CompletionHooks>,
    ctx: JobContext,
}

/// Shared receiving end of the job queue. Workers take turns locking it
/// to dequeue; execution itself happens outside the lock.
type SharedQueue = Arc<Mutex<mpsc::UnboundedReceiver<QueuedJob>>>;

// ---------------------------------------------------------------------------
// TaskManager
// ---------------------------------------------------------------------------

/// Owns the worker pool and the job queue.
///
/// Created once at startup via [`TaskManager::start`]; the returned `Arc`
/// is cheap to clone into request handlers.
pub struct TaskManager {
    store: Arc<JobStore>,
    queue_tx: mpsc::UnboundedSender<QueuedJob>,
    cancel: CancellationToken,
    workers: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl TaskManager {
    /// Spawn `worker_count` pool workers over an injected job arena.
    pub fn start(store: Arc<JobStore>, worker_count: usize) -> Arc<Self> {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let queue: SharedQueue = Arc::new(Mutex::new(queue_rx));
        let cancel = CancellationToken::new();

        let workers = (0..worker_count)
            .map(|worker_idx| {
                tokio::spawn(worker_loop(
                    worker_idx,
                    Arc::clone(&queue),
                    Arc::clone(&store),
                    cancel.clone(),
                ))
            })
            .collect();

        tracing::info!(worker_count, "Task manager started");

        Arc::new(Self {
            store,
            queue_tx,
            cancel,
            workers: Mutex::new(workers),
        })
    }

    /// Queue `work` for execution and return its job id immediately.
    ///
    /// Exactly one of the two hooks will run after the work terminates,
    /// with `ctx` passed through unchanged.
    pub async fn submit(
        &self,
        work: JobFuture,
        hooks: Arc<dyn CompletionHooks>,
        ctx: JobContext,
    ) -> JobId {
        let id = uuid::Uuid::new_v4();
        self.store.insert_pending(id).await;

        let queued = QueuedJob {
            id,
            work,
            hooks,
            ctx,
        };
        if self.queue_tx.send(queued).is_err() {
            // The pool is shutting down and the receiver is gone.
            self.store.fail(id, "task manager is shutting down").await;
            tracing::warn!(job_id = %id, "Job rejected: task manager is shutting down");
            return id;
        }

        tracing::info!(job_id = %id, "Job submitted");
        id
    }

    /// Snapshot a job's status. Unknown ids yield `not_found`.
    pub async fn status(&self, id: JobId) -> JobView {
        self.store.view(id).await
    }

    /// Stop accepting queue items and wait for in-flight jobs to finish.
    ///
    /// Jobs still waiting in the queue are dropped and remain `pending`
    /// in the arena; there is no persistence across restarts anyway.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task join failed during shutdown");
            }
        }
        tracing::info!("Task manager stopped");
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

async fn worker_loop(
    worker_idx: usize,
    queue: SharedQueue,
    store: Arc<JobStore>,
    cancel: CancellationToken,
) {
    loop {
        let queued = {
            let mut rx = queue.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => None,
                job = rx.recv() => job,
            }
        };

        let Some(queued) = queued else {
            break;
        };

        run_job(&store, queued).await;
    }
    tracing::debug!(worker_idx, "Job worker stopped");
}

/// Execute one job: run the work, classify the outcome once, record the
/// terminal state, then invoke exactly one callback.
async fn run_job(store: &JobStore, queued: QueuedJob) {
    let QueuedJob {
        id,
        work,
        hooks,
        ctx,
    } = queued;

    store.set_running(id).await;
    tracing::info!(job_id = %id, asset_kind = ctx.asset_kind.as_str(), "Job started");

    let outcome = match std::panic::AssertUnwindSafe(work).catch_unwind().await {
        Ok(Ok(result)) => match result.error.clone() {
            Some(message) => {
                // Graceful failure: the call returned normally but
                // produced no usable output. Prefer the reasons the
                // provider attached; otherwise classify the message.
                let reasons = if result.safety_reasons.is_empty() {
                    classify_rejection(&message)
                } else {
                    result.safety_reasons.clone()
                };
                Outcome::GracefulFailure {
                    result,
                    failure: GenerationFailure { message, reasons },
                }
            }
            None => Outcome::Success(result),
        },
        Ok(Err(e)) => Outcome::Exception(GenerationFailure {
            message: e.to_string(),
            reasons: Vec::new(),
        }),
        Err(panic) => Outcome::Exception(GenerationFailure {
            message: panic_message(panic),
            reasons: Vec::new(),
        }),
    };

    // Terminal state is recorded before the callback runs, so a status
    // query never observes a job whose callback fired but whose state is
    // still running.
    match outcome {
        Outcome::Success(result) => {
            let payload = serde_json::to_value(&result).unwrap_or(serde_json::Value::Null);
            store.complete(id, payload).await;
            tracing::info!(job_id = %id, "Job completed");
            invoke(hooks.on_success(&result, &ctx), id, "on_success").await;
        }
        Outcome::GracefulFailure { result, failure } => {
            let payload = serde_json::to_value(&result).unwrap_or(serde_json::Value::Null);
            store.complete(id, payload).await;
            tracing::warn!(job_id = %id, error = %failure.message, "Job completed with a handled error");
            invoke(hooks.on_error(&failure, &ctx), id, "on_error").await;
        }
        Outcome::Exception(failure) => {
            store.fail(id, &failure.message).await;
            tracing::error!(job_id = %id, error = %failure.message, "Job failed");
            invoke(hooks.on_error(&failure, &ctx), id, "on_error").await;
        }
    }
}

/// Run a callback, logging and swallowing both errors and panics: the
/// job's recorded status must not change, and the worker must survive.
async fn invoke(
    fut: impl Future<Output = Result<(), crate::outcome::CallbackError>>,
    id: JobId,
    name: &str,
) {
    match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(job_id = %id, callback = name, error = %e, "Callback failed");
        }
        Err(panic) => {
            tracing::error!(
                job_id = %id,
                callback = name,
                error = %panic_message(panic),
                "Callback panicked",
            );
        }
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "job panicked".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use chrono::Utc;
    use mediagen_core::generation::{GenerationResult, OutputArtifact};
    use mediagen_core::pricing::AssetKind;

    use super::*;
    use crate::job::JobQueryState;
    use crate::outcome::CallbackError;

    // -- helpers ---------------------------------------------------------

    struct RecordingHooks {
        successes: AtomicUsize,
        errors: AtomicUsize,
        last_failure: StdMutex<Option<GenerationFailure>>,
        fail_callback: bool,
    }

    impl RecordingHooks {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                successes: AtomicUsize::new(0),
                errors: AtomicUsize::new(0),
                last_failure: StdMutex::new(None),
                fail_callback: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                successes: AtomicUsize::new(0),
                errors: AtomicUsize::new(0),
                last_failure: StdMutex::new(None),
                fail_callback: true,
            })
        }

        fn invocations(&self) -> (usize, usize) {
            (
                self.successes.load(Ordering::SeqCst),
                self.errors.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait::async_trait]
    impl CompletionHooks for RecordingHooks {
        async fn on_success(
            &self,
            _result: &GenerationResult,
            _ctx: &JobContext,
        ) -> Result<(), CallbackError> {
            self.successes.fetch_add(1, Ordering::SeqCst);
            if self.fail_callback {
                return Err(CallbackError("usage log insert failed".to_string()));
            }
            Ok(())
        }

        async fn on_error(
            &self,
            failure: &GenerationFailure,
            _ctx: &JobContext,
        ) -> Result<(), CallbackError> {
            self.errors.fetch_add(1, Ordering::SeqCst);
            *self.last_failure.lock().unwrap() = Some(failure.clone());
            if self.fail_callback {
                return Err(CallbackError("usage log insert failed".to_string()));
            }
            Ok(())
        }
    }

    fn ctx() -> JobContext {
        JobContext {
            caller: "alice@example.com".to_string(),
            project_id: None,
            asset_kind: AssetKind::Video,
            model_id: "veo-3.0-generate-001".to_string(),
            prompt: Some("a red fox in the snow".to_string()),
            negative_prompt: None,
            video_duration_secs: Some(8),
            with_audio: false,
            resolution: None,
            aspect_ratio: None,
            triggered_at: Utc::now(),
        }
    }

    fn clean_result() -> GenerationResult {
        GenerationResult {
            message: "Video generation successful.".to_string(),
            artifacts: vec![OutputArtifact {
                uri: "gs://out/a.mp4".to_string(),
                resolution: None,
            }],
            operation_secs: 42.0,
            ..GenerationResult::default()
        }
    }

    async fn wait_terminal(manager: &TaskManager, id: JobId) -> JobView {
        for _ in 0..500 {
            let view = manager.status(id).await;
            if matches!(
                view.status,
                JobQueryState::Completed | JobQueryState::Failed
            ) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {id} never reached a terminal state");
    }

    // -- lifecycle -------------------------------------------------------

    #[tokio::test]
    async fn successful_job_completes_and_calls_on_success_once() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 2);
        let hooks = RecordingHooks::new();

        let id = manager
            .submit(
                Box::pin(async { Ok(clean_result()) }),
                hooks.clone(),
                ctx(),
            )
            .await;

        let view = wait_terminal(&manager, id).await;
        assert_eq!(view.status, JobQueryState::Completed);
        assert!(view.error.is_none());

        // Give the callback (which runs after the state write) a moment.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hooks.invocations(), (1, 0));
    }

    #[tokio::test]
    async fn graceful_failure_completes_but_calls_on_error() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 2);
        let hooks = RecordingHooks::new();

        let result = GenerationResult {
            message: "Video generation failed.".to_string(),
            error: Some("blocked: Support codes: 58061214".to_string()),
            ..GenerationResult::default()
        };
        let id = manager
            .submit(Box::pin(async move { Ok(result) }), hooks.clone(), ctx())
            .await;

        let view = wait_terminal(&manager, id).await;
        // Recorded completed, with the full payload available to clients.
        assert_eq!(view.status, JobQueryState::Completed);
        assert!(view.result.unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("blocked"));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hooks.invocations(), (0, 1));

        let failure = hooks.last_failure.lock().unwrap().clone().unwrap();
        assert_eq!(failure.reasons.len(), 1);
        assert_eq!(failure.reasons[0].code, "58061214");
    }

    #[tokio::test]
    async fn attached_reasons_take_precedence_over_reclassification() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 1);
        let hooks = RecordingHooks::new();

        let result = GenerationResult {
            error: Some("all candidates filtered".to_string()),
            safety_reasons: mediagen_core::safety::classify_rejection("Support codes: 62263041"),
            ..GenerationResult::default()
        };
        let id = manager
            .submit(Box::pin(async move { Ok(result) }), hooks.clone(), ctx())
            .await;

        wait_terminal(&manager, id).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let failure = hooks.last_failure.lock().unwrap().clone().unwrap();
        assert_eq!(failure.reasons.len(), 1);
        assert_eq!(failure.reasons[0].code, "62263041");
    }

    #[tokio::test]
    async fn raising_job_fails_and_calls_on_error_once() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 2);
        let hooks = RecordingHooks::new();

        let id = manager
            .submit(
                Box::pin(async {
                    Err::<GenerationResult, JobError>("connection reset by peer".into())
                }),
                hooks.clone(),
                ctx(),
            )
            .await;

        let view = wait_terminal(&manager, id).await;
        assert_eq!(view.status, JobQueryState::Failed);
        assert_eq!(view.error.as_deref(), Some("connection reset by peer"));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hooks.invocations(), (0, 1));
    }

    #[tokio::test]
    async fn panicking_job_fails_without_killing_the_worker() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 1);
        let hooks = RecordingHooks::new();

        let work: JobFuture = Box::pin(async { panic!("simulated worker bug") });
        let id = manager.submit(work, hooks.clone(), ctx()).await;
        let view = wait_terminal(&manager, id).await;
        assert_eq!(view.status, JobQueryState::Failed);
        assert!(view.error.unwrap().contains("simulated worker bug"));

        // The single worker must still be alive to run the next job.
        let id2 = manager
            .submit(
                Box::pin(async { Ok(clean_result()) }),
                hooks.clone(),
                ctx(),
            )
            .await;
        let view2 = wait_terminal(&manager, id2).await;
        assert_eq!(view2.status, JobQueryState::Completed);
    }

    #[tokio::test]
    async fn failing_callback_does_not_change_recorded_status() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 1);
        let hooks = RecordingHooks::failing();

        let id = manager
            .submit(
                Box::pin(async { Ok(clean_result()) }),
                hooks.clone(),
                ctx(),
            )
            .await;
        wait_terminal(&manager, id).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(hooks.invocations(), (1, 0));
        assert_eq!(
            manager.status(id).await.status,
            JobQueryState::Completed,
        );

        // And the worker survives for the next job.
        let id2 = manager
            .submit(
                Box::pin(async { Ok(clean_result()) }),
                hooks.clone(),
                ctx(),
            )
            .await;
        let view2 = wait_terminal(&manager, id2).await;
        assert_eq!(view2.status, JobQueryState::Completed);
    }

    #[tokio::test]
    async fn submissions_beyond_pool_size_queue_and_all_finish() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 2);
        let hooks = RecordingHooks::new();

        let mut ids = Vec::new();
        for _ in 0..8 {
            let id = manager
                .submit(
                    Box::pin(async {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok(clean_result())
                    }),
                    hooks.clone(),
                    ctx(),
                )
                .await;
            ids.push(id);
        }

        for id in ids {
            let view = wait_terminal(&manager, id).await;
            assert_eq!(view.status, JobQueryState::Completed);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hooks.invocations(), (8, 0));
    }

    #[tokio::test]
    async fn shutdown_stops_workers() {
        let manager = TaskManager::start(Arc::new(JobStore::new()), 2);
        manager.shutdown().await;

        // Submissions after shutdown are recorded failed immediately.
        let hooks = RecordingHooks::new();
        let id = manager
            .submit(
                Box::pin(async { Ok(clean_result()) }),
                hooks,
                ctx(),
            )
            .await;
        // The queue receiver may still be alive if workers exited without
        // draining; either way the job must not linger running.
        let view = manager.status(id).await;
        assert_matches!(
            view.status,
            JobQueryState::Pending | JobQueryState::Failed
        );
    }
}
