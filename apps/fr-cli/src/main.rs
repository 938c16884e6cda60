use clap::{Args, Parser, Subcommand, ValueEnum};
use fr_batch::{run_batch, Backend, BatchRequest, RunKind};
use fr_config::{load_conditions_csv, load_medium, load_regime, Condition};
use fr_medium::{audit_exchange_ids, parse_rxn_fix, write_audit_csv, FluxOverride};
use fr_model::load_model;
use fr_regime::{
    build_regime_table, load_features_csv, write_features_csv, write_regime_csv,
    DEFAULT_EPS, DEFAULT_INFTY_BOUND,
};
use fr_results::{collect_features, PartitionStore};
use fr_solver::SimplexSolver;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fluxregime")]
#[command(about = "Condition-driven metabolic flux simulation and regime tables", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run FBA + targeted FVA for all conditions in parallel
    RunFva(RunFvaArgs),
    /// Run plain FBA with per-nutrient saturation columns per condition
    RunFba(RunFbaArgs),
    /// Build the wide feature matrix from FVA partitions
    CollectFeatures {
        /// Directory of per-condition FVA partitions
        #[arg(long)]
        parts_dir: PathBuf,
        /// Conditions CSV
        #[arg(long)]
        conditions: PathBuf,
        /// Output features CSV path
        #[arg(long)]
        out: PathBuf,
    },
    /// Assemble the regime dataset from features + conditions
    BuildRegime {
        /// Features CSV (from collect-features)
        #[arg(long)]
        features: PathBuf,
        /// Conditions CSV
        #[arg(long)]
        conditions: PathBuf,
        /// Medium YAML/JSON config
        #[arg(long)]
        medium: PathBuf,
        /// Optional directory of plain-FBA partitions to pull objective
        /// values from
        #[arg(long)]
        objective_from: Option<PathBuf>,
        /// Output regime CSV path
        #[arg(long)]
        out: PathBuf,
    },
    /// Check every reaction id the medium config references against the
    /// model
    Audit {
        /// Network description JSON path
        #[arg(long)]
        model: PathBuf,
        /// Medium YAML/JSON config
        #[arg(long)]
        medium: PathBuf,
        /// Output audit CSV path
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct BatchArgs {
    /// Network description JSON path
    #[arg(long)]
    model: PathBuf,
    /// Conditions CSV (one row per condition)
    #[arg(long)]
    conditions: PathBuf,
    /// Medium YAML/JSON config
    #[arg(long)]
    medium: PathBuf,
    /// Output directory for per-condition partitions
    #[arg(long, default_value = "results/parts")]
    outdir: PathBuf,
    /// Parallel workers; 1 disables parallelism
    #[arg(long, default_value_t = 1)]
    n_jobs: usize,
    /// Worker pool flavor
    #[arg(long, value_enum, default_value = "threads")]
    backend: BackendArg,
    /// Run only the first N conditions
    #[arg(long)]
    limit: Option<usize>,
    /// Run only these condition_id values (overrides --limit)
    #[arg(long, num_args = 1..)]
    condition_ids: Option<Vec<String>>,
    /// Fix reaction flux: "RXNID=value". Repeatable.
    #[arg(long = "rxn-fix")]
    rxn_fix: Vec<String>,
}

#[derive(Args)]
struct RunFvaArgs {
    #[command(flatten)]
    batch: BatchArgs,
    /// Targets JSON (non-empty array of reaction ids)
    #[arg(long)]
    targets: PathBuf,
    /// Fraction of the optimal objective enforced during FVA
    #[arg(long, default_value_t = 0.95)]
    fraction: f64,
}

#[derive(Args)]
struct RunFbaArgs {
    #[command(flatten)]
    batch: BatchArgs,
    /// Regime YAML/JSON config (candidate reaction ids per nutrient)
    #[arg(long)]
    regime_config: PathBuf,
    /// Saturation tolerance on flux-vs-bound agreement
    #[arg(long, default_value_t = DEFAULT_EPS)]
    eps: f64,
    /// |bound| at or beyond this counts as open/infinite
    #[arg(long, default_value_t = DEFAULT_INFTY_BOUND)]
    infty_bound: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Threads,
    Serial,
}

impl From<BackendArg> for Backend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Threads => Backend::Threads,
            BackendArg::Serial => Backend::Serial,
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    /// Fatal before any work is dispatched; exits with code 2.
    #[error("{0}")]
    Preflight(String),

    #[error(transparent)]
    Batch(#[from] fr_batch::BatchError),

    #[error(transparent)]
    Results(#[from] fr_results::ResultsError),

    #[error(transparent)]
    Regime(#[from] fr_regime::RegimeError),

    #[error(transparent)]
    Medium(#[from] fr_medium::MediumError),
}

fn preflight(message: impl Into<String>) -> CliError {
    CliError::Preflight(message.into())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Preflight(message)) => {
            eprintln!("[ERROR] {message}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("[ERROR] {err}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::RunFva(args) => cmd_run_fva(args),
        Commands::RunFba(args) => cmd_run_fba(args),
        Commands::CollectFeatures {
            parts_dir,
            conditions,
            out,
        } => cmd_collect_features(&parts_dir, &conditions, &out),
        Commands::BuildRegime {
            features,
            conditions,
            medium,
            objective_from,
            out,
        } => cmd_build_regime(&features, &conditions, &medium, objective_from.as_deref(), &out),
        Commands::Audit { model, medium, out } => cmd_audit(&model, &medium, &out),
    }
}

/// Shared pre-flight for the batch runners: everything here fails fast,
/// before any parallel work is dispatched.
fn load_batch_inputs(
    args: &BatchArgs,
) -> Result<(Vec<Condition>, fr_config::MediumConfig, Vec<FluxOverride>), CliError> {
    if !args.model.exists() {
        return Err(preflight(format!(
            "Model file not found: {}",
            args.model.display()
        )));
    }
    let medium = load_medium(&args.medium)
        .map_err(|e| preflight(format!("Failed to load medium config: {e}")))?;
    let conditions = load_conditions_csv(&args.conditions)
        .map_err(|e| preflight(format!("Failed to load conditions: {e}")))?;
    let overrides =
        parse_rxn_fix(&args.rxn_fix).map_err(|e| preflight(format!("Bad --rxn-fix: {e}")))?;

    let selected = select_conditions(conditions, args)?;
    Ok((selected, medium, overrides))
}

fn select_conditions(
    conditions: Vec<Condition>,
    args: &BatchArgs,
) -> Result<Vec<Condition>, CliError> {
    if let Some(wanted) = &args.condition_ids {
        let wanted: std::collections::HashSet<&str> =
            wanted.iter().map(String::as_str).collect();
        let before = conditions.len();
        let subset: Vec<Condition> = conditions
            .iter()
            .filter(|c| wanted.contains(c.condition_id.as_str()))
            .cloned()
            .collect();
        if subset.is_empty() {
            let example: Vec<&str> = conditions
                .iter()
                .take(10)
                .map(|c| c.condition_id.as_str())
                .collect();
            return Err(preflight(format!(
                "None of the requested --condition-ids were found. Example available ids: {}",
                example.join(", ")
            )));
        }
        tracing::info!(before, after = subset.len(), "subset by --condition-ids");
        Ok(subset)
    } else if let Some(limit) = args.limit {
        if limit == 0 {
            return Err(preflight("--limit must be a positive integer"));
        }
        let before = conditions.len();
        let subset: Vec<Condition> = conditions.into_iter().take(limit).collect();
        tracing::info!(before, after = subset.len(), "subset by --limit");
        Ok(subset)
    } else {
        Ok(conditions)
    }
}

fn load_targets_json(path: &Path) -> Result<Vec<String>, CliError> {
    if !path.exists() {
        return Err(preflight(format!(
            "Targets JSON not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| preflight(format!("Failed to read targets JSON: {e}")))?;
    let targets: Vec<String> = serde_json::from_str(&content)
        .map_err(|e| preflight(format!("Targets JSON must be an array of reaction ids: {e}")))?;
    if targets.is_empty() {
        return Err(preflight(
            "Targets JSON must be a non-empty array of reaction ids",
        ));
    }
    Ok(targets)
}

fn cmd_run_fva(args: RunFvaArgs) -> Result<(), CliError> {
    if !(args.fraction > 0.0 && args.fraction <= 1.0) {
        return Err(preflight(format!(
            "--fraction must be in (0, 1], got {}",
            args.fraction
        )));
    }
    if args.batch.n_jobs == 0 {
        return Err(preflight("--n-jobs must be a positive integer"));
    }
    let targets = load_targets_json(&args.targets)?;
    let (conditions, medium, overrides) = load_batch_inputs(&args.batch)?;

    let request = BatchRequest {
        conditions: &conditions,
        model_path: &args.batch.model,
        medium: &medium,
        kind: RunKind::Fva {
            targets,
            fraction_of_optimum: args.fraction,
        },
        overrides,
        parallelism: args.batch.n_jobs,
        backend: args.batch.backend.into(),
        outdir: &args.batch.outdir,
    };
    let summary = run_batch(&request, &SimplexSolver::new())?;
    print_batch_summary(&summary, &args.batch.outdir);
    Ok(())
}

fn cmd_run_fba(args: RunFbaArgs) -> Result<(), CliError> {
    if args.batch.n_jobs == 0 {
        return Err(preflight("--n-jobs must be a positive integer"));
    }
    let regime = load_regime(&args.regime_config)
        .map_err(|e| preflight(format!("Failed to load regime config: {e}")))?;
    let (conditions, medium, overrides) = load_batch_inputs(&args.batch)?;

    let request = BatchRequest {
        conditions: &conditions,
        model_path: &args.batch.model,
        medium: &medium,
        kind: RunKind::FbaRegime {
            regime,
            eps: args.eps,
            infty_bound: args.infty_bound,
        },
        overrides,
        parallelism: args.batch.n_jobs,
        backend: args.batch.backend.into(),
        outdir: &args.batch.outdir,
    };
    let summary = run_batch(&request, &SimplexSolver::new())?;
    print_batch_summary(&summary, &args.batch.outdir);
    Ok(())
}

fn print_batch_summary(summary: &fr_batch::BatchSummary, outdir: &Path) {
    println!(
        "[OK] Completed conditions={}; failed={}",
        summary.n_conditions,
        summary.failures.len()
    );
    println!("[OK] Outputs in: {}", outdir.display());
    println!(
        "[OK] Failed conditions log: {}",
        outdir.join(fr_results::store::FAILURE_REPORT_NAME).display()
    );
}

fn cmd_collect_features(
    parts_dir: &Path,
    conditions_path: &Path,
    out: &Path,
) -> Result<(), CliError> {
    if !parts_dir.exists() {
        return Err(preflight(format!(
            "parts-dir not found: {}",
            parts_dir.display()
        )));
    }
    let conditions = load_conditions_csv(conditions_path)
        .map_err(|e| preflight(format!("Failed to load conditions: {e}")))?;

    let table = collect_features(parts_dir, &conditions)?;
    write_features_csv(&table, out)?;
    println!(
        "[OK] Wrote features for {} conditions to {}",
        table.rows.len(),
        out.display()
    );
    Ok(())
}

fn cmd_build_regime(
    features_path: &Path,
    conditions_path: &Path,
    medium_path: &Path,
    objective_from: Option<&Path>,
    out: &Path,
) -> Result<(), CliError> {
    let medium = load_medium(medium_path)
        .map_err(|e| preflight(format!("Failed to load medium config: {e}")))?;
    let conditions = load_conditions_csv(conditions_path)
        .map_err(|e| preflight(format!("Failed to load conditions: {e}")))?;
    let features = load_features_csv(features_path)?;

    let objectives = match objective_from {
        Some(dir) => {
            if !dir.exists() {
                return Err(preflight(format!(
                    "objective-from dir not found: {}",
                    dir.display()
                )));
            }
            Some(PartitionStore::new(dir.to_path_buf())?.load_fba_objectives()?)
        }
        None => None,
    };

    let rows = build_regime_table(&features, &conditions, &medium, objectives.as_ref())?;
    write_regime_csv(&rows, out)?;
    println!("[OK] Wrote {} regime rows to {}", rows.len(), out.display());
    Ok(())
}

fn cmd_audit(model_path: &Path, medium_path: &Path, out: &Path) -> Result<(), CliError> {
    if !model_path.exists() {
        return Err(preflight(format!(
            "Model file not found: {}",
            model_path.display()
        )));
    }
    let medium = load_medium(medium_path)
        .map_err(|e| preflight(format!("Failed to load medium config: {e}")))?;
    let model = load_model(model_path)
        .map_err(|e| preflight(format!("Failed to load model: {e}")))?;

    let rows = audit_exchange_ids(&model, &medium);
    let missing = rows
        .iter()
        .filter(|r| r.status == fr_medium::AuditStatus::Missing)
        .count();
    write_audit_csv(&rows, out)?;
    println!(
        "[OK] Audited {} reaction ids ({} missing) -> {}",
        rows.len(),
        missing,
        out.display()
    );
    Ok(())
}
