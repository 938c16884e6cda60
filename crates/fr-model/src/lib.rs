//! fr-model: in-memory constraint model and network-description loading.
//!
//! A [`ConstraintModel`] is the mutable network of named reactions the rest
//! of the pipeline operates on: each reaction carries a lower/upper flux
//! bound, sparse metabolite stoichiometry, and an objective coefficient.
//! Bound mutation goes through strict setters that refuse to leave the model
//! in a `lb > ub` state.

pub mod load;
pub mod model;
pub mod reaction;

pub use load::{load_model, ModelDoc, ReactionDoc};
pub use model::ConstraintModel;
pub use reaction::Reaction;

pub type ModelResult<T> = Result<T, ModelError>;

/// Default flux bound magnitude used when the network description omits one.
pub const DEFAULT_BOUND: f64 = 1000.0;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model file not found: {path}")]
    FileNotFound { path: String },

    #[error("Reaction not found in model: {id}")]
    UnknownReaction { id: String },

    #[error("Duplicate reaction id in model: {id}")]
    DuplicateReaction { id: String },

    #[error("Invalid bounds for {id}: lb {lb} > ub {ub}")]
    InvalidBounds { id: String, lb: f64, ub: f64 },

    #[error("Non-finite bound for {id}: {value}")]
    NonFiniteBound { id: String, value: f64 },
}
