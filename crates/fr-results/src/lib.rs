//! fr-results: per-condition result partitions and feature collection.
//!
//! Each condition writes exactly one partition file named by a sanitized
//! condition id; re-running a condition overwrites only its own partition.
//! The partition directory plus the failure report together account for
//! every condition in a batch.

pub mod collect;
pub mod store;
pub mod types;

pub use collect::collect_features;
pub use store::PartitionStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parts directory not found: {path}")]
    PartsDirNotFound { path: String },

    #[error("No result partitions found under: {path}")]
    NoPartitions { path: String },

    #[error("Missing required column in {path}: {column}")]
    MissingColumn { column: String, path: String },

    #[error("Duplicate rows for (condition_id, reaction_id): ({condition_id}, {reaction_id})")]
    DuplicatePair {
        condition_id: String,
        reaction_id: String,
    },

    #[error("Invalid value in {path}: {what}")]
    InvalidValue { path: String, what: String },
}
