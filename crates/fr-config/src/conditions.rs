//! Condition-table loading.
//!
//! One CSV row per experimental condition. Only `condition_id` is
//! structurally required; concentration cells that fail to parse become
//! `None` rather than errors, matching how hand-curated lab tables arrive.

use crate::{ConfigError, ConfigResult};
use std::path::Path;

/// One experimental condition (immutable after load).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    pub condition_id: String,
    pub set_name: Option<String>,
    /// Initial culture pH. Metadata only; never turned into a constraint.
    pub ph0: Option<f64>,
    pub yeast_extract_g_l: Option<f64>,
    pub nh4cl_g_l: Option<f64>,
    pub acetate_mm: Option<f64>,
    pub notes: Option<String>,
    pub measured_od: Option<f64>,
}

/// Column headers recognized in the conditions CSV.
const COL_CONDITION_ID: &str = "condition_id";
const COL_SET_NAME: &str = "set_name";
const COL_PH0: &str = "pH0";
const COL_YEAST: &str = "yeast_extract_gL";
const COL_NH4CL: &str = "nh4cl_gL";
const COL_ACETATE: &str = "acetate_mM";
const COL_NOTES: &str = "notes";
const COL_MEASURED_OD: &str = "measured_OD";

fn parse_optional_f64(cell: Option<&str>) -> Option<f64> {
    let s = cell?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

fn parse_optional_str(cell: Option<&str>) -> Option<String> {
    let s = cell?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Load the experiment conditions table (one row = one condition).
pub fn load_conditions_csv(path: &Path) -> ConfigResult<Vec<Condition>> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let id_idx = col(COL_CONDITION_ID).ok_or_else(|| ConfigError::MissingColumn {
        column: COL_CONDITION_ID.to_string(),
        path: path.display().to_string(),
    })?;
    let set_idx = col(COL_SET_NAME);
    let ph0_idx = col(COL_PH0);
    let yeast_idx = col(COL_YEAST);
    let nh4_idx = col(COL_NH4CL);
    let ac_idx = col(COL_ACETATE);
    let notes_idx = col(COL_NOTES);
    let od_idx = col(COL_MEASURED_OD);

    let mut conditions = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i));

        conditions.push(Condition {
            condition_id: record.get(id_idx).unwrap_or("").trim().to_string(),
            set_name: parse_optional_str(cell(set_idx)),
            ph0: parse_optional_f64(cell(ph0_idx)),
            yeast_extract_g_l: parse_optional_f64(cell(yeast_idx)),
            nh4cl_g_l: parse_optional_f64(cell(nh4_idx)),
            acetate_mm: parse_optional_f64(cell(ac_idx)),
            notes: parse_optional_str(cell(notes_idx)),
            measured_od: parse_optional_f64(cell(od_idx)),
        });
    }

    tracing::info!(
        path = %path.display(),
        n_conditions = conditions.len(),
        "loaded conditions table"
    );
    Ok(conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp_csv(content: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("fr_conditions_{nanos}.csv"));
        std::fs::write(&path, content).expect("failed to write temp csv");
        path
    }

    #[test]
    fn loads_rows_with_forgiving_numerics() {
        let path = write_temp_csv(
            "condition_id,set_name,pH0,yeast_extract_gL,nh4cl_gL,acetate_mM,notes,measured_OD\n\
             C1,acetate_gradient,7.0,0.0,0.5,10,,0.42\n\
             C2,acetate_gradient,,0.2,n/a,25,check pH,\n",
        );
        let conditions = load_conditions_csv(&path).unwrap();
        assert_eq!(conditions.len(), 2);

        assert_eq!(conditions[0].condition_id, "C1");
        assert_eq!(conditions[0].acetate_mm, Some(10.0));
        assert_eq!(conditions[0].measured_od, Some(0.42));
        assert_eq!(conditions[0].notes, None);

        // unparsable and empty cells become None, not errors
        assert_eq!(conditions[1].ph0, None);
        assert_eq!(conditions[1].nh4cl_g_l, None);
        assert_eq!(conditions[1].notes.as_deref(), Some("check pH"));
    }

    #[test]
    fn missing_condition_id_column_is_fatal() {
        let path = write_temp_csv("set_name,acetate_mM\nacetate_gradient,10\n");
        let err = load_conditions_csv(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingColumn { .. }));
    }
}
