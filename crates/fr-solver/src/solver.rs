//! Bundled `FluxSolver` implementation.

use crate::lp::Lp;
use crate::simplex::maximize;
use crate::{FluxRange, FluxSolution, FluxSolver, SolveStatus, SolverError, SolverResult};
use fr_model::ConstraintModel;
use std::collections::BTreeMap;

/// Dense bounded-variable simplex over the model's steady-state constraints.
///
/// Stateless and `Sync`; safe to share across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexSolver;

impl SimplexSolver {
    pub fn new() -> Self {
        Self
    }
}

impl FluxSolver for SimplexSolver {
    fn solve(&self, model: &ConstraintModel) -> SolverResult<FluxSolution> {
        let lp = Lp::from_model(model);
        let out = maximize(&lp, &lp.objective_cost())?;
        if out.status != SolveStatus::Optimal {
            return Ok(FluxSolution::non_optimal(out.status));
        }

        let mut fluxes = BTreeMap::new();
        for (rxn_id, &var) in &lp.var_of_rxn {
            fluxes.insert(rxn_id.clone(), out.x[var]);
        }
        Ok(FluxSolution {
            status: SolveStatus::Optimal,
            objective_value: out.objective,
            fluxes,
        })
    }

    fn flux_ranges(
        &self,
        model: &ConstraintModel,
        targets: &[String],
        fraction_of_optimum: f64,
    ) -> SolverResult<Vec<FluxRange>> {
        if targets.is_empty() {
            return Err(SolverError::InvalidArg {
                what: "targets is empty".to_string(),
            });
        }
        if !(fraction_of_optimum > 0.0 && fraction_of_optimum <= 1.0) {
            return Err(SolverError::InvalidArg {
                what: format!(
                    "fraction_of_optimum must be in (0, 1], got {fraction_of_optimum}"
                ),
            });
        }

        // de-dup while preserving order
        let mut seen = std::collections::HashSet::new();
        let targets: Vec<&String> = targets.iter().filter(|t| seen.insert(t.as_str())).collect();

        let lp = Lp::from_model(model);
        let base = maximize(&lp, &lp.objective_cost())?;
        if base.status != SolveStatus::Optimal {
            return Err(SolverError::NonOptimal {
                status: base.status,
            });
        }

        let floor = fraction_of_optimum * base.objective;
        let relaxed = lp.with_objective_floor(floor);
        tracing::debug!(
            n_targets = targets.len(),
            fraction = fraction_of_optimum,
            floor,
            "running targeted range-solve"
        );

        let mut ranges = Vec::with_capacity(targets.len());
        for target in targets {
            let var = *relaxed
                .var_of_rxn
                .get(target.as_str())
                .ok_or_else(|| SolverError::InvalidArg {
                    what: format!("target reaction not in model: {target}"),
                })?;

            let hi = maximize(&relaxed, &relaxed.single_var_cost(var, 1.0))?;
            let lo = maximize(&relaxed, &relaxed.single_var_cost(var, -1.0))?;
            for out in [&hi, &lo] {
                if out.status != SolveStatus::Optimal {
                    return Err(SolverError::NonOptimal { status: out.status });
                }
            }

            ranges.push(FluxRange {
                reaction_id: target.clone(),
                min: lo.x[var],
                max: hi.x[var],
            });
        }
        Ok(ranges)
    }
}
