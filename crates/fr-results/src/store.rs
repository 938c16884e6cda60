//! Partition storage API.

use crate::types::{BatchManifest, Failure, FbaRegimeRecord, FvaRecord};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const FAILURE_REPORT_NAME: &str = "failed_conditions.csv";
pub const MANIFEST_NAME: &str = "manifest.json";

/// One CSV file per condition under a flat output directory.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    root_dir: PathBuf,
}

/// Replace path separators so any condition id yields a flat, safe file
/// name.
pub fn sanitize_condition_id(condition_id: &str) -> String {
    condition_id.trim().replace(['/', '\\'], "_")
}

impl PartitionStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Partition path for a condition; the unit of idempotent re-run.
    pub fn partition_path(&self, condition_id: &str) -> PathBuf {
        self.root_dir
            .join(format!("condition_id={}.csv", sanitize_condition_id(condition_id)))
    }

    pub fn has_partition(&self, condition_id: &str) -> bool {
        self.partition_path(condition_id).exists()
    }

    /// Write (or overwrite) one condition's FVA partition.
    pub fn write_fva_partition(
        &self,
        condition_id: &str,
        records: &[FvaRecord],
    ) -> ResultsResult<PathBuf> {
        let path = self.partition_path(condition_id);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([
            "condition_id",
            "objective_value",
            "reaction_id",
            "fva_min",
            "fva_max",
        ])?;
        for r in records {
            writer.write_record([
                r.condition_id.clone(),
                r.objective_value.to_string(),
                r.reaction_id.clone(),
                r.fva_min.to_string(),
                r.fva_max.to_string(),
            ])?;
        }
        writer.flush()?;
        tracing::debug!(path = %path.display(), n_rows = records.len(), "wrote FVA partition");
        Ok(path)
    }

    /// Write (or overwrite) one condition's plain-FBA partition: a single
    /// wide row with per-nutrient saturation columns.
    pub fn write_fba_partition(&self, record: &FbaRegimeRecord) -> ResultsResult<PathBuf> {
        let path = self.partition_path(&record.condition_id);
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["condition_id".to_string(), "objective_value".to_string()];
        let mut row = vec![
            record.condition_id.clone(),
            record.objective_value.to_string(),
        ];
        for n in &record.nutrients {
            for suffix in ["rid", "flux", "lb", "ub", "is_constrained", "sat", "sat_side"] {
                header.push(format!("{}_{}", n.nutrient, suffix));
            }
            row.push(n.rid.clone());
            row.push(fmt_nan(n.flux));
            row.push(fmt_nan(n.lb));
            row.push(fmt_nan(n.ub));
            row.push(n.is_constrained.to_string());
            row.push(n.saturated.as_csv_field().to_string());
            row.push(n.sat_side.as_str().to_string());
        }
        writer.write_record(&header)?;
        writer.write_record(&row)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), "wrote FBA partition");
        Ok(path)
    }

    /// All partition files under the store, sorted by file name.
    pub fn list_partitions(&self) -> ResultsResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if path.is_file() && name.starts_with("condition_id=") && name.ends_with(".csv") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read one FVA partition back into records.
    pub fn load_fva_partition(path: &Path) -> ResultsResult<Vec<FvaRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let col = |name: &str| -> ResultsResult<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ResultsError::MissingColumn {
                    column: name.to_string(),
                    path: path.display().to_string(),
                })
        };
        let id_idx = col("condition_id")?;
        let obj_idx = col("objective_value")?;
        let rxn_idx = col("reaction_id")?;
        let min_idx = col("fva_min")?;
        let max_idx = col("fva_max")?;

        let parse = |record: &csv::StringRecord, idx: usize| -> ResultsResult<f64> {
            let raw = record.get(idx).unwrap_or("").trim();
            raw.parse::<f64>().map_err(|_| ResultsError::InvalidValue {
                path: path.display().to_string(),
                what: format!("not a number: {raw:?}"),
            })
        };

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(FvaRecord {
                condition_id: record.get(id_idx).unwrap_or("").trim().to_string(),
                objective_value: parse(&record, obj_idx)?,
                reaction_id: record.get(rxn_idx).unwrap_or("").trim().to_string(),
                fva_min: parse(&record, min_idx)?,
                fva_max: parse(&record, max_idx)?,
            });
        }
        Ok(records)
    }

    /// Objective value per condition from plain-FBA partitions.
    pub fn load_fba_objectives(
        &self,
    ) -> ResultsResult<std::collections::HashMap<String, f64>> {
        let mut out = std::collections::HashMap::new();
        for path in self.list_partitions()? {
            let mut reader = csv::Reader::from_path(&path)?;
            let headers = reader.headers()?.clone();
            let (Some(id_idx), Some(obj_idx)) = (
                headers.iter().position(|h| h == "condition_id"),
                headers.iter().position(|h| h == "objective_value"),
            ) else {
                continue;
            };
            for record in reader.records() {
                let record = record?;
                let cid = record.get(id_idx).unwrap_or("").trim().to_string();
                if let Some(v) = record.get(obj_idx).and_then(|s| s.trim().parse::<f64>().ok()) {
                    out.insert(cid, v);
                }
                break; // one row per FBA partition
            }
        }
        Ok(out)
    }

    /// Write the accumulated failure report, once, after the batch.
    pub fn write_failure_report(&self, failures: &[Failure]) -> ResultsResult<PathBuf> {
        let path = self.root_dir.join(FAILURE_REPORT_NAME);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["condition_id", "error_type", "error_message"])?;
        for f in failures {
            writer.write_record([
                f.condition_id.as_str(),
                f.error_type.as_str(),
                f.error_message.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_manifest(&self, manifest: &BatchManifest) -> ResultsResult<PathBuf> {
        let path = self.root_dir.join(MANIFEST_NAME);
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

fn fmt_nan(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}
