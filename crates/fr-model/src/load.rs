//! Network-description file loading.
//!
//! The on-disk format is a small JSON document: a model id plus a reaction
//! list with bounds, stoichiometry, and objective coefficients. Validation
//! (duplicate ids, inverted bounds) happens once at load via
//! [`ConstraintModel::from_reactions`].

use crate::model::ConstraintModel;
use crate::reaction::Reaction;
use crate::{ModelResult, ModelError, DEFAULT_BOUND};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reactions: Vec<ReactionDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionDoc {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// metabolite id -> stoichiometric coefficient; BTreeMap keeps the
    /// serialized form and the built model deterministic.
    #[serde(default)]
    pub metabolites: BTreeMap<String, f64>,
    #[serde(default = "default_lower_bound")]
    pub lower_bound: f64,
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,
    #[serde(default)]
    pub objective_coefficient: f64,
}

fn default_lower_bound() -> f64 {
    -DEFAULT_BOUND
}

fn default_upper_bound() -> f64 {
    DEFAULT_BOUND
}

impl ModelDoc {
    pub fn into_model(self) -> ModelResult<ConstraintModel> {
        let reactions = self
            .reactions
            .into_iter()
            .map(|doc| Reaction {
                id: doc.id,
                name: doc.name,
                metabolites: doc.metabolites.into_iter().collect(),
                lower_bound: doc.lower_bound,
                upper_bound: doc.upper_bound,
                objective_coefficient: doc.objective_coefficient,
            })
            .collect();
        ConstraintModel::from_reactions(self.id, reactions)
    }
}

/// Load and validate a network description file.
pub fn load_model(path: &Path) -> ModelResult<ConstraintModel> {
    if !path.exists() {
        return Err(ModelError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    tracing::debug!(path = %path.display(), "loading network description");
    let content = std::fs::read_to_string(path)?;
    let doc: ModelDoc = serde_json::from_str(&content)?;
    doc.into_model()
}
