//! Job execution engine and quota admission (PRD-03, PRD-11).
//!
//! [`manager::TaskManager`] runs generation work on a bounded pool of
//! long-lived workers and reports each job's terminal outcome through
//! exactly one callback. [`admission::AdmissionController`] decides, before
//! a job is created, whether the caller may proceed under the configured
//! usage quota.

pub mod admission;
pub mod job;
pub mod manager;
pub mod outcome;

pub use admission::{AdmissionController, AdmissionDecision, PgUsageSource, UsageSource};
pub use job::{JobStore, JobView};
pub use manager::TaskManager;
pub use outcome::{CallbackError, CompletionHooks, GenerationFailure, JobContext, Outcome};
