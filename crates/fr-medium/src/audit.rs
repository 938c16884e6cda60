//! Config-vs-model exchange audit.
//!
//! Every reaction id the medium config references is checked against the
//! model before a long campaign; drift shows up here instead of as a pile
//! of per-condition warnings.

use crate::MediumResult;
use fr_config::MediumConfig;
use fr_model::ConstraintModel;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Present,
    Missing,
}

impl AuditStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditStatus::Present => "present",
            AuditStatus::Missing => "missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditRow {
    pub requested_id: String,
    pub status: AuditStatus,
}

/// Collect every reaction id the medium config references, de-duplicated
/// preserving first-seen order: exchange mappings, base-bound keys, and the
/// yeast-extract open list.
fn collect_requested_ids(config: &MediumConfig) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let mut push = |rid: &str| {
        let rid = rid.trim();
        if !rid.is_empty() && !ids.iter().any(|seen| seen == rid) {
            ids.push(rid.to_string());
        }
    };
    for rid in config.exchanges.values() {
        push(rid);
    }
    for rid in config.base_bounds.keys() {
        push(rid);
    }
    for rid in &config.yeast_extract.open_exchanges_when_enabled {
        push(rid);
    }
    ids
}

pub fn audit_exchange_ids(model: &ConstraintModel, config: &MediumConfig) -> Vec<AuditRow> {
    collect_requested_ids(config)
        .into_iter()
        .map(|requested_id| {
            let status = if model.contains(&requested_id) {
                AuditStatus::Present
            } else {
                AuditStatus::Missing
            };
            AuditRow {
                requested_id,
                status,
            }
        })
        .collect()
}

pub fn write_audit_csv(rows: &[AuditRow], out_path: &Path) -> MediumResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(out_path)?;
    writer.write_record(["requested_id", "status"])?;
    for row in rows {
        writer.write_record([row.requested_id.as_str(), row.status.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
