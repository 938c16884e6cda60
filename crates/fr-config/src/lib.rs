//! fr-config: typed run configuration and condition-table loading.
//!
//! The medium and regime configurations are deserialized into typed structs
//! and validated once, at load time; downstream code never probes nested
//! maps with per-call defaults.

pub mod conditions;
pub mod schema;
pub mod validate;

pub use conditions::{load_conditions_csv, Condition};
pub use schema::*;
pub use validate::{validate_medium, validate_regime};

use std::path::Path;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported config extension: {path} (expected .yaml/.yml/.json)")]
    UnsupportedExtension { path: String },

    #[error("medium config exchanges must be a non-empty mapping")]
    EmptyExchanges,

    #[error("medium config exchanges must include key: {nutrient}")]
    MissingExchange { nutrient: &'static str },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required column in {path}: {column}")]
    MissingColumn { column: String, path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn read_by_extension<T: serde::de::DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(ConfigError::UnsupportedExtension {
            path: path.display().to_string(),
        }),
    }
}

/// Load and validate a medium configuration (YAML or JSON by extension).
pub fn load_medium(path: &Path) -> ConfigResult<MediumConfig> {
    let config: MediumConfig = read_by_extension(path)?;
    validate_medium(&config)?;
    Ok(config)
}

/// Load and validate a regime configuration (candidate reaction ids per
/// nutrient).
pub fn load_regime(path: &Path) -> ConfigResult<RegimeConfig> {
    let config: RegimeConfig = read_by_extension(path)?;
    validate_regime(&config)?;
    Ok(config)
}
