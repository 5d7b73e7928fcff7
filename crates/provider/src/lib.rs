//! Client for the external generation provider.
//!
//! The provider exposes generation as long-running operations: a start
//! call returns an operation handle, and the handle is polled until it
//! reports done. [`poller::OperationPoller`] drives a single operation to
//! a terminal outcome; [`generate::run_generation`] folds that outcome
//! into the [`GenerationResult`](mediagen_core::generation::GenerationResult)
//! payload job callbacks consume.

pub mod generate;
pub mod operations;
pub mod poller;
pub mod rest;

pub use operations::{OperationClient, OperationHandle, OperationStatus, ProviderError, StartRequest};
pub use poller::{OperationPoller, TerminalOutcome};
pub use rest::RestOperationClient;
