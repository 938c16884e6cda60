//! Feature collection: FVA partitions -> wide per-condition matrix.
//!
//! For every `(condition, reaction)` pair the long records yield
//! `width = fva_max - fva_min`, `mid = (fva_max + fva_min) / 2`, and a
//! sign-change flag (`fva_min < 0 < fva_max`); the wide pivot prefixes the
//! columns `width__` / `mid__` / `signchange__` per reaction and joins the
//! condition metadata needed downstream.

use crate::store::PartitionStore;
use crate::types::FvaRecord;
use crate::{ResultsError, ResultsResult};
use fr_config::Condition;
use fr_regime::{FeatureRow, FeatureTable};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

struct PairFeatures {
    width: f64,
    mid: f64,
    signchange: bool,
}

/// Build the wide feature table from a partition directory.
///
/// Inner join with the conditions table: only conditions present on both
/// sides produce a row, in conditions-table order. Duplicate
/// `(condition_id, reaction_id)` pairs across partitions are an error.
pub fn collect_features(
    parts_dir: &Path,
    conditions: &[Condition],
) -> ResultsResult<FeatureTable> {
    if !parts_dir.exists() {
        return Err(ResultsError::PartsDirNotFound {
            path: parts_dir.display().to_string(),
        });
    }
    let store = PartitionStore::new(parts_dir.to_path_buf())?;
    let files = store.list_partitions()?;
    if files.is_empty() {
        return Err(ResultsError::NoPartitions {
            path: parts_dir.display().to_string(),
        });
    }
    tracing::info!(n_files = files.len(), parts_dir = %parts_dir.display(), "loading partitions");

    let mut records: Vec<FvaRecord> = Vec::new();
    for file in &files {
        records.extend(PartitionStore::load_fva_partition(file)?);
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut by_condition: HashMap<String, HashMap<String, PairFeatures>> = HashMap::new();
    let mut reaction_ids: BTreeSet<String> = BTreeSet::new();
    for r in records {
        if !seen.insert((r.condition_id.clone(), r.reaction_id.clone())) {
            return Err(ResultsError::DuplicatePair {
                condition_id: r.condition_id,
                reaction_id: r.reaction_id,
            });
        }
        reaction_ids.insert(r.reaction_id.clone());
        by_condition.entry(r.condition_id).or_default().insert(
            r.reaction_id,
            PairFeatures {
                width: r.fva_max - r.fva_min,
                mid: (r.fva_max + r.fva_min) / 2.0,
                signchange: r.fva_min < 0.0 && r.fva_max > 0.0,
            },
        );
    }

    // wide columns: width block, mid block, signchange block, reactions
    // sorted within each block
    let mut columns = Vec::with_capacity(3 * reaction_ids.len());
    for prefix in ["width__", "mid__", "signchange__"] {
        for rid in &reaction_ids {
            columns.push(format!("{prefix}{rid}"));
        }
    }

    let mut rows = Vec::new();
    for condition in conditions {
        let Some(pairs) = by_condition.get(&condition.condition_id) else {
            continue;
        };
        let mut values = Vec::with_capacity(columns.len());
        for selector in [0usize, 1, 2] {
            for rid in &reaction_ids {
                values.push(pairs.get(rid).map(|p| match selector {
                    0 => p.width,
                    1 => p.mid,
                    _ => {
                        if p.signchange {
                            1.0
                        } else {
                            0.0
                        }
                    }
                }));
            }
        }
        rows.push(FeatureRow {
            condition_id: condition.condition_id.clone(),
            set_name: condition.set_name.clone(),
            measured_od: condition.measured_od,
            values,
        });
    }

    tracing::info!(
        n_reactions = reaction_ids.len(),
        n_rows = rows.len(),
        "built wide feature matrix"
    );
    Ok(FeatureTable::new(columns, rows))
}
