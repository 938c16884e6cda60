//! Batch scheduling and failure isolation.

use crate::task::run_one_condition;
use crate::{BatchResult, TaskError};
use fr_config::{Condition, MediumConfig, RegimeConfig};
use fr_medium::FluxOverride;
use fr_results::{BatchManifest, Failure, PartitionStore};
use fr_solver::FluxSolver;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

/// What each condition's task computes and writes.
#[derive(Debug, Clone)]
pub enum RunKind {
    /// FBA plus targeted flux variability: one FVA row per (condition,
    /// target).
    Fva {
        targets: Vec<String>,
        fraction_of_optimum: f64,
    },
    /// Plain FBA with per-nutrient saturation columns.
    FbaRegime {
        regime: RegimeConfig,
        eps: f64,
        infty_bound: f64,
    },
}

impl RunKind {
    fn label(&self) -> &'static str {
        match self {
            RunKind::Fva { .. } => "fva",
            RunKind::FbaRegime { .. } => "fba_regime",
        }
    }
}

/// Worker-pool flavor. The bundled solver is single-threaded and `Sync`,
/// so a thread pool with one solver per task already gives the
/// one-inner-thread-per-worker cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Threads,
    Serial,
}

pub struct BatchRequest<'a> {
    pub conditions: &'a [Condition],
    pub model_path: &'a Path,
    pub medium: &'a MediumConfig,
    pub kind: RunKind,
    pub overrides: Vec<FluxOverride>,
    /// Worker count; `1` runs fully sequential regardless of backend.
    pub parallelism: usize,
    pub backend: Backend,
    pub outdir: &'a Path,
}

#[derive(Debug)]
pub struct BatchSummary {
    pub n_conditions: usize,
    pub partitions_written: usize,
    pub failures: Vec<Failure>,
}

/// Run the whole batch: one isolated task per condition, collected in
/// completion order, failure report and manifest written once at the end.
///
/// Per-condition failures never make this return `Err`; only the batch
/// mechanism itself (output directory, worker pool) can.
pub fn run_batch<S: FluxSolver>(request: &BatchRequest, solver: &S) -> BatchResult<BatchSummary> {
    let store = PartitionStore::new(request.outdir.to_path_buf())?;

    tracing::info!(
        run_kind = request.kind.label(),
        n_conditions = request.conditions.len(),
        n_overrides = request.overrides.len(),
        parallelism = request.parallelism,
        backend = ?request.backend,
        "running batch"
    );

    let run_one = |condition: &Condition| -> Option<Failure> {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            run_one_condition(
                condition,
                request.model_path,
                request.medium,
                &request.kind,
                &request.overrides,
                &store,
                solver,
            )
        }));
        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(task_err)) => Some(failure_from_task(condition, &task_err)),
            Err(panic_payload) => Some(Failure {
                condition_id: condition.condition_id.clone(),
                error_type: "panic".to_string(),
                error_message: panic_message(panic_payload.as_ref()),
            }),
        }
    };

    let use_pool = request.backend == Backend::Threads && request.parallelism > 1;
    let failures: Vec<Failure> = if use_pool {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(request.parallelism)
            .build()?;
        pool.install(|| {
            request
                .conditions
                .par_iter()
                .filter_map(run_one)
                .collect()
        })
    } else {
        request.conditions.iter().filter_map(run_one).collect()
    };

    store.write_failure_report(&failures)?;
    let manifest = BatchManifest::new(
        request.kind.label(),
        request.conditions.len(),
        failures.len(),
    );
    store.write_manifest(&manifest)?;

    tracing::info!(
        n_conditions = request.conditions.len(),
        n_failed = failures.len(),
        outdir = %request.outdir.display(),
        "batch complete"
    );

    Ok(BatchSummary {
        n_conditions: request.conditions.len(),
        partitions_written: request.conditions.len() - failures.len(),
        failures,
    })
}

fn failure_from_task(condition: &Condition, err: &TaskError) -> Failure {
    let condition_id = match err {
        // a row with no id still gets a (blank-keyed) failure record
        TaskError::MissingConditionId => String::new(),
        _ => condition.condition_id.clone(),
    };
    tracing::warn!(
        condition_id = %condition_id,
        error_type = err.kind(),
        error = %err,
        "condition failed"
    );
    Failure {
        condition_id,
        error_type: err.kind().to_string(),
        error_message: err.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
