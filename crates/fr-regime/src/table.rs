//! Regime-table assembly.

use crate::features::{FeatureTable, MID_PREFIX, WIDTH_PREFIX};
use crate::saturation::{applied_bound, classify, Saturation, DEFAULT_SAT_TOL, DEFAULT_WIDTH_TOL};
use crate::RegimeResult;
use fr_config::{Condition, MediumConfig, Nutrient};
use std::collections::HashMap;
use std::path::Path;

const TOP_K: usize = 10;

/// One row of the regime dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeRow {
    pub condition_id: String,
    pub set_name: Option<String>,
    pub measured_od: Option<f64>,
    pub objective_value: Option<f64>,
    pub acetate_sat: Saturation,
    pub o2_sat: Saturation,
    pub nh4_sat: Saturation,
    pub pi_sat: Saturation,
    /// Reaction ids with the narrowest feasible ranges, `;`-joined.
    pub top_10_narrow_reactions: String,
    pub top_10_wide_reactions: String,
}

/// Build the regime table: saturation flags for the four tracked nutrients
/// plus the top-10 narrow/wide reaction rankings.
///
/// Inner join on `condition_id`: feature rows without a matching condition
/// are dropped, not emitted as half-filled rows. Downstream training only
/// wants fully specified examples.
pub fn build_regime_table(
    features: &FeatureTable,
    conditions: &[Condition],
    medium: &MediumConfig,
    objective_by_condition: Option<&HashMap<String, f64>>,
) -> RegimeResult<Vec<RegimeRow>> {
    let condition_by_id: HashMap<&str, &Condition> = conditions
        .iter()
        .map(|c| (c.condition_id.as_str(), c))
        .collect();

    let mut out = Vec::new();
    for row in &features.rows {
        let Some(condition) = condition_by_id.get(row.condition_id.as_str()) else {
            continue;
        };

        let sat = |nutrient: Nutrient| -> Saturation {
            let Some(rxn_id) = medium.exchange_for(nutrient).filter(|r| !r.is_empty()) else {
                return Saturation::Unknown;
            };
            let bound = applied_bound(medium, condition, nutrient);
            let mid = features.value(row, &format!("{MID_PREFIX}{rxn_id}"));
            let width = features.value(row, &format!("{WIDTH_PREFIX}{rxn_id}"));
            classify(mid, width, bound, DEFAULT_SAT_TOL, DEFAULT_WIDTH_TOL)
        };

        out.push(RegimeRow {
            condition_id: row.condition_id.clone(),
            set_name: row.set_name.clone(),
            measured_od: row.measured_od,
            objective_value: objective_by_condition
                .and_then(|m| m.get(&row.condition_id).copied()),
            acetate_sat: sat(Nutrient::Acetate),
            o2_sat: sat(Nutrient::Oxygen),
            nh4_sat: sat(Nutrient::Ammonium),
            pi_sat: sat(Nutrient::Phosphate),
            top_10_narrow_reactions: top_k_by_width(features, row, TOP_K, true),
            top_10_wide_reactions: top_k_by_width(features, row, TOP_K, false),
        });
    }

    tracing::info!(
        n_feature_rows = features.rows.len(),
        n_regime_rows = out.len(),
        "built regime table"
    );
    Ok(out)
}

/// Rank reactions by their width feature for one row. The sort is stable,
/// so ties keep the original column order across runs.
fn top_k_by_width(
    features: &FeatureTable,
    row: &crate::features::FeatureRow,
    k: usize,
    smallest: bool,
) -> String {
    let mut entries: Vec<(&str, f64)> = features
        .width_columns()
        .filter_map(|(i, rid)| {
            let v = row.values.get(i).copied().flatten()?;
            if v.is_nan() {
                return None;
            }
            Some((rid, v))
        })
        .collect();

    if smallest {
        entries.sort_by(|a, b| a.1.partial_cmp(&b.1).expect("widths are non-NaN"));
    } else {
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("widths are non-NaN"));
    }

    entries
        .iter()
        .take(k)
        .map(|(rid, _)| *rid)
        .collect::<Vec<_>>()
        .join(";")
}

/// Write the regime dataset with the table shape downstream training
/// expects.
pub fn write_regime_csv(rows: &[RegimeRow], out_path: &Path) -> RegimeResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(out_path)?;
    writer.write_record([
        "condition_id",
        "set_name",
        "measured_OD",
        "objective_value",
        "acetate_sat",
        "o2_sat",
        "nh4_sat",
        "pi_sat",
        "top_10_narrow_reactions",
        "top_10_wide_reactions",
    ])?;
    for row in rows {
        writer.write_record([
            row.condition_id.clone(),
            row.set_name.clone().unwrap_or_default(),
            row.measured_od.map(|v| v.to_string()).unwrap_or_default(),
            row.objective_value
                .map(|v| v.to_string())
                .unwrap_or_default(),
            row.acetate_sat.as_csv_field().to_string(),
            row.o2_sat.as_csv_field().to_string(),
            row.nh4_sat.as_csv_field().to_string(),
            row.pi_sat.as_csv_field().to_string(),
            row.top_10_narrow_reactions.clone(),
            row.top_10_wide_reactions.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
