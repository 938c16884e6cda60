//! Result data types.

use fr_regime::{SatSide, Saturation};
use serde::{Deserialize, Serialize};

/// One FVA result row: flux range of one target reaction under one
/// condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FvaRecord {
    pub condition_id: String,
    pub objective_value: f64,
    pub reaction_id: String,
    pub fva_min: f64,
    pub fva_max: f64,
}

/// Saturation summary for one tracked nutrient in a plain-FBA row.
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientSat {
    /// Column prefix (`acetate`, `oxygen`, `ammonium`, `phosphate`).
    pub nutrient: &'static str,
    pub rid: String,
    pub flux: f64,
    pub lb: f64,
    pub ub: f64,
    pub is_constrained: bool,
    pub saturated: Saturation,
    pub sat_side: SatSide,
}

/// One plain-FBA result row: objective value plus per-nutrient saturation
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FbaRegimeRecord {
    pub condition_id: String,
    pub objective_value: f64,
    pub nutrients: Vec<NutrientSat>,
}

/// Per-condition failure captured at the task boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub condition_id: String,
    pub error_type: String,
    pub error_message: String,
}

/// Written once per batch next to the partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifest {
    pub run_kind: String,
    pub timestamp: String,
    pub n_conditions: usize,
    pub n_succeeded: usize,
    pub n_failed: usize,
}

impl BatchManifest {
    pub fn new(run_kind: &str, n_conditions: usize, n_failed: usize) -> Self {
        Self {
            run_kind: run_kind.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            n_conditions,
            n_succeeded: n_conditions - n_failed,
            n_failed,
        }
    }
}
