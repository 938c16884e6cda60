//! fr-solver: the constraint-solving seam.
//!
//! Everything downstream of this crate sees only the [`FluxSolver`] trait:
//! "solve the model, get an objective value and per-reaction fluxes, or
//! fail", plus the targeted range-solve used for flux variability. The
//! bundled [`SimplexSolver`] is a dense bounded-variable simplex on
//! nalgebra, adequate for the reduced networks this pipeline runs; swapping
//! in external LP bindings means implementing the trait, nothing else.

mod lp;
mod simplex;
pub mod solver;

pub use solver::SimplexSolver;

use fr_model::ConstraintModel;
use std::collections::BTreeMap;
use std::fmt;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(thiserror::Error, Debug)]
pub enum SolverError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Numerical failure: {what}")]
    Numerical { what: String },

    #[error("Solve finished with non-optimal status: {status}")]
    NonOptimal { status: SolveStatus },
}

/// Terminal status of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
        };
        f.write_str(s)
    }
}

/// Result of one constrained solve.
///
/// A non-optimal status still yields a value (with NaN objective and empty
/// fluxes) so callers can decide how to report it; only structural misuse
/// of the solver is an `Err`.
#[derive(Debug, Clone)]
pub struct FluxSolution {
    pub status: SolveStatus,
    pub objective_value: f64,
    pub fluxes: BTreeMap<String, f64>,
}

impl FluxSolution {
    pub fn non_optimal(status: SolveStatus) -> Self {
        Self {
            status,
            objective_value: f64::NAN,
            fluxes: BTreeMap::new(),
        }
    }

    pub fn flux(&self, rxn_id: &str) -> Option<f64> {
        self.fluxes.get(rxn_id).copied()
    }
}

/// Min/max feasible flux for one target reaction under the relaxed
/// objective.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxRange {
    pub reaction_id: String,
    pub min: f64,
    pub max: f64,
}

/// The solve collaborator: opaque to the orchestrator.
pub trait FluxSolver: Send + Sync {
    /// Optimize the model objective; per-reaction fluxes on success.
    fn solve(&self, model: &ConstraintModel) -> SolverResult<FluxSolution>;

    /// Targeted flux variability: for each target reaction, the minimum and
    /// maximum feasible flux while the objective stays within
    /// `fraction_of_optimum` of its optimal value.
    fn flux_ranges(
        &self,
        model: &ConstraintModel,
        targets: &[String],
        fraction_of_optimum: f64,
    ) -> SolverResult<Vec<FluxRange>>;
}
