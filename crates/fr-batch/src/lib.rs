//! fr-batch: the parallel constrained-simulation orchestrator.
//!
//! One independent task per condition: load a fresh model, compile the
//! condition into bounds, apply overrides, solve, write one partition.
//! Every expected error kind and any panic is converted into a `Failure`
//! record at the task boundary; the batch itself never aborts because one
//! condition failed.

pub mod orchestrator;
pub mod task;

pub use orchestrator::{run_batch, Backend, BatchRequest, BatchSummary, RunKind};
pub use task::TaskError;

pub type BatchResult<T> = Result<T, BatchError>;

/// Batch-mechanism failures: these are NOT per-condition failures, they
/// mean the batch itself could not run to completion.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("Results error: {0}")]
    Results(#[from] fr_results::ResultsError),

    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
