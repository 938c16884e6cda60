//! Wide per-condition feature matrix.
//!
//! One row per condition; feature columns are `width__<rxn>`, `mid__<rxn>`,
//! and `signchange__<rxn>`. Column order is preserved end to end so that
//! tie-breaking in the regime ranking is reproducible bit for bit.

use crate::{RegimeError, RegimeResult};
use std::collections::HashMap;
use std::path::Path;

pub const WIDTH_PREFIX: &str = "width__";
pub const MID_PREFIX: &str = "mid__";
pub const SIGNCHANGE_PREFIX: &str = "signchange__";

const COL_CONDITION_ID: &str = "condition_id";
const COL_SET_NAME: &str = "set_name";
const COL_MEASURED_OD: &str = "measured_OD";

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub condition_id: String,
    pub set_name: Option<String>,
    pub measured_od: Option<f64>,
    /// Parallel to `FeatureTable::feature_columns`.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct FeatureTable {
    feature_columns: Vec<String>,
    column_index: HashMap<String, usize>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(feature_columns: Vec<String>, rows: Vec<FeatureRow>) -> Self {
        let column_index = feature_columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            feature_columns,
            column_index,
            rows,
        }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Value of a named feature column for one row; `None` when the column
    /// does not exist or the cell is empty.
    pub fn value(&self, row: &FeatureRow, column: &str) -> Option<f64> {
        let i = *self.column_index.get(column)?;
        row.values.get(i).copied().flatten()
    }

    /// `(column index, reaction id)` pairs of the width columns, in table
    /// order.
    pub fn width_columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.feature_columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.strip_prefix(WIDTH_PREFIX).map(|rid| (i, rid)))
    }
}

/// Load a features CSV. Fails fast if the structural columns
/// (`condition_id`, `set_name`, `measured_OD`) are missing; unknown
/// non-feature columns are ignored.
pub fn load_features_csv(path: &Path) -> RegimeResult<FeatureTable> {
    if !path.exists() {
        return Err(RegimeError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let id_idx = require_column(col(COL_CONDITION_ID), COL_CONDITION_ID, path)?;
    let set_idx = require_column(col(COL_SET_NAME), COL_SET_NAME, path)?;
    let od_idx = require_column(col(COL_MEASURED_OD), COL_MEASURED_OD, path)?;

    let feature_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            h.starts_with(WIDTH_PREFIX)
                || h.starts_with(MID_PREFIX)
                || h.starts_with(SIGNCHANGE_PREFIX)
        })
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values = feature_cols
            .iter()
            .map(|(i, _)| parse_cell(record.get(*i)))
            .collect();
        rows.push(FeatureRow {
            condition_id: record.get(id_idx).unwrap_or("").trim().to_string(),
            set_name: record
                .get(set_idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            measured_od: parse_cell(record.get(od_idx)),
            values,
        });
    }

    Ok(FeatureTable::new(
        feature_cols.into_iter().map(|(_, name)| name).collect(),
        rows,
    ))
}

pub fn write_features_csv(table: &FeatureTable, out_path: &Path) -> RegimeResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(out_path)?;

    let mut header = vec![
        COL_CONDITION_ID.to_string(),
        COL_SET_NAME.to_string(),
        COL_MEASURED_OD.to_string(),
    ];
    header.extend(table.feature_columns().iter().cloned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![
            row.condition_id.clone(),
            row.set_name.clone().unwrap_or_default(),
            row.measured_od.map(fmt_f64).unwrap_or_default(),
        ];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(fmt_f64).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn require_column(idx: Option<usize>, column: &str, path: &Path) -> RegimeResult<usize> {
    idx.ok_or_else(|| RegimeError::MissingColumn {
        column: column.to_string(),
        path: path.display().to_string(),
    })
}

fn parse_cell(cell: Option<&str>) -> Option<f64> {
    let s = cell?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

fn fmt_f64(v: f64) -> String {
    // round-trippable without scientific noise for typical flux magnitudes
    format!("{v}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(tag: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("fr_features_{tag}_{nanos}.csv"))
    }

    #[test]
    fn roundtrip_preserves_column_order_and_values() {
        let table = FeatureTable::new(
            vec![
                "width__R2".to_string(),
                "width__R1".to_string(),
                "mid__R2".to_string(),
                "mid__R1".to_string(),
            ],
            vec![FeatureRow {
                condition_id: "C1".to_string(),
                set_name: Some("acetate_gradient".to_string()),
                measured_od: Some(0.42),
                values: vec![Some(1.5), Some(0.25), None, Some(-0.5)],
            }],
        );

        let path = temp_path("roundtrip");
        write_features_csv(&table, &path).unwrap();
        let loaded = load_features_csv(&path).unwrap();

        assert_eq!(loaded.feature_columns(), table.feature_columns());
        assert_eq!(loaded.rows.len(), 1);
        let row = &loaded.rows[0];
        assert_eq!(row.condition_id, "C1");
        assert_eq!(loaded.value(row, "width__R2"), Some(1.5));
        assert_eq!(loaded.value(row, "mid__R2"), None);
        assert_eq!(loaded.value(row, "mid__R1"), Some(-0.5));
    }

    #[test]
    fn missing_measured_od_column_is_fatal() {
        let path = temp_path("missing_od");
        std::fs::write(&path, "condition_id,set_name,width__R1\nC1,s,0.1\n").unwrap();
        let err = load_features_csv(&path).unwrap_err();
        assert!(matches!(err, RegimeError::MissingColumn { .. }));
    }
}
