use std::sync::Arc;

use mediagen_engine::admission::{AdmissionController, PgUsageSource};
use mediagen_engine::TaskManager;
use mediagen_provider::{OperationClient, OperationPoller};

use crate::config::ServerConfig;
use crate::recorder::UsageRecorder;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is `Copy`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mediagen_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Bounded job executor.
    pub task_manager: Arc<TaskManager>,
    /// Quota admission controller over the Postgres usage aggregation.
    pub admission: Arc<AdmissionController<PgUsageSource>>,
    /// Generation provider client.
    pub provider: Arc<dyn OperationClient>,
    /// Poller configuration applied to every generation operation.
    pub poller: OperationPoller,
    /// Persistence callbacks handed to every submitted job.
    pub recorder: Arc<UsageRecorder>,
}
