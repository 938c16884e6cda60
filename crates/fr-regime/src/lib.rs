//! fr-regime: nutrient-saturation semantics and the regime table.
//!
//! Decides, per condition and nutrient, whether the nutrient's transport
//! reaction is pinned at its applied bound across the whole feasible range
//! ("saturated" = that nutrient limits growth), and assembles the regime
//! dataset consumed by downstream classifier training.

pub mod features;
pub mod saturation;
pub mod table;

pub use features::{load_features_csv, write_features_csv, FeatureRow, FeatureTable};
pub use saturation::{
    applied_bound, classify, saturation_for_reaction, SatSide, Saturation, SaturationResult,
    DEFAULT_EPS, DEFAULT_INFTY_BOUND, DEFAULT_SAT_TOL, DEFAULT_WIDTH_TOL,
};
pub use table::{build_regime_table, write_regime_csv, RegimeRow};

pub type RegimeResult<T> = Result<T, RegimeError>;

#[derive(thiserror::Error, Debug)]
pub enum RegimeError {
    #[error("Features file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required column in {path}: {column}")]
    MissingColumn { column: String, path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
