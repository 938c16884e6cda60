//! The per-condition task body and its error taxonomy.

use crate::orchestrator::RunKind;
use fr_config::{Condition, MediumConfig, Nutrient};
use fr_core::{ensure_finite, FrError};
use fr_medium::{apply_condition, apply_flux_overrides, FluxOverride, MediumError};
use fr_model::{load_model, ModelError};
use fr_regime::{saturation_for_reaction, SaturationResult};
use fr_results::{FbaRegimeRecord, FvaRecord, NutrientSat, PartitionStore, ResultsError};
use fr_solver::{FluxSolver, SolveStatus, SolverError};
use std::path::Path;

/// Everything that can go wrong inside one condition's task. The variants
/// map onto the reported `error_type` kinds; nothing here ever crosses the
/// pool boundary as a panic or an early batch abort.
#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error("missing condition_id in row")]
    MissingConditionId,

    #[error(transparent)]
    Medium(#[from] MediumError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("solve finished with status: {status}")]
    NonOptimal { status: SolveStatus },

    #[error(transparent)]
    Invariant(#[from] FrError),

    #[error(transparent)]
    Results(#[from] ResultsError),
}

impl TaskError {
    /// Kind name recorded in the failure report.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::MissingConditionId => "InputError",
            TaskError::Medium(_) => "ConfigError",
            TaskError::Model(_) => "InputError",
            TaskError::Solver(_) | TaskError::NonOptimal { .. } | TaskError::Invariant(_) => {
                "SolveError"
            }
            TaskError::Results(_) => "IoError",
        }
    }
}

/// Run one condition end to end and write its partition.
pub fn run_one_condition<S: FluxSolver>(
    condition: &Condition,
    model_path: &Path,
    medium: &MediumConfig,
    kind: &RunKind,
    overrides: &[FluxOverride],
    store: &PartitionStore,
    solver: &S,
) -> Result<(), TaskError> {
    if condition.condition_id.is_empty() {
        return Err(TaskError::MissingConditionId);
    }
    let cid = condition.condition_id.as_str();

    // fresh model per task: bound mutation is task-local by construction
    let mut model = load_model(model_path)?;
    apply_condition(&mut model, condition, medium)?;
    apply_flux_overrides(&mut model, overrides)?;

    let solution = solver.solve(&model)?;
    if solution.status != SolveStatus::Optimal {
        return Err(TaskError::NonOptimal {
            status: solution.status,
        });
    }
    let objective_value = ensure_finite(solution.objective_value, "objective_value")?;

    match kind {
        RunKind::Fva {
            targets,
            fraction_of_optimum,
        } => {
            let ranges = solver.flux_ranges(&model, targets, *fraction_of_optimum)?;
            let records: Vec<FvaRecord> = ranges
                .into_iter()
                .map(|r| FvaRecord {
                    condition_id: cid.to_string(),
                    objective_value,
                    reaction_id: r.reaction_id,
                    fva_min: r.min,
                    fva_max: r.max,
                })
                .collect();
            store.write_fva_partition(cid, &records)?;
        }
        RunKind::FbaRegime {
            regime,
            eps,
            infty_bound,
        } => {
            let mut nutrients = Vec::with_capacity(Nutrient::ALL.len());
            for nutrient in Nutrient::ALL {
                let candidates = regime.candidates(nutrient);
                let sat = match model.first_existing_id(candidates) {
                    None => SaturationResult::missing(),
                    Some(rid) => {
                        let flux = solution.flux(rid).unwrap_or(f64::NAN);
                        let (lb, ub) = model.bounds(rid)?;
                        saturation_for_reaction(rid, flux, lb, ub, *eps, *infty_bound)
                    }
                };
                nutrients.push(NutrientSat {
                    nutrient: nutrient.key(),
                    rid: sat.rid,
                    flux: sat.flux,
                    lb: sat.lb,
                    ub: sat.ub,
                    is_constrained: sat.is_constrained,
                    saturated: sat.saturated,
                    sat_side: sat.sat_side,
                });
            }
            store.write_fba_partition(&FbaRegimeRecord {
                condition_id: cid.to_string(),
                objective_value,
                nutrients,
            })?;
        }
    }

    Ok(())
}
