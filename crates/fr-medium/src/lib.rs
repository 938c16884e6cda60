//! fr-medium: condition -> constraint compilation.
//!
//! [`apply_condition`] translates one condition row plus the medium
//! configuration into bound mutations on a constraint model and returns a
//! complete audit of what changed. Fixed-flux overrides (`--rxn-fix`) and
//! the config-vs-model exchange audit live here too.

pub mod apply;
pub mod audit;
pub mod overrides;

pub use apply::{apply_condition, BoundChange, MediumApplyResult};
pub use audit::{audit_exchange_ids, write_audit_csv, AuditRow, AuditStatus};
pub use overrides::{apply_flux_overrides, parse_rxn_fix, FluxOverride};

pub type MediumResult<T> = Result<T, MediumError>;

#[derive(thiserror::Error, Debug)]
pub enum MediumError {
    #[error("Invalid medium config: {what}")]
    Config { what: String },

    #[error("Reaction not found in model: {id}")]
    UnknownReaction { id: String },

    #[error("Invalid flux override: {what}")]
    InvalidOverride { what: String },

    #[error("Model error: {0}")]
    Model(#[from] fr_model::ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
