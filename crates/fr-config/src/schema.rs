//! Config schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four nutrients whose limitation status the pipeline tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Acetate,
    Oxygen,
    Ammonium,
    Phosphate,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Acetate,
        Nutrient::Oxygen,
        Nutrient::Ammonium,
        Nutrient::Phosphate,
    ];

    /// Key used in config files and wide result columns.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Acetate => "acetate",
            Nutrient::Oxygen => "oxygen",
            Nutrient::Ammonium => "ammonium",
            Nutrient::Phosphate => "phosphate",
        }
    }

    /// Short label used for the regime-table saturation flags.
    pub fn short(self) -> &'static str {
        match self {
            Nutrient::Acetate => "acetate",
            Nutrient::Oxygen => "o2",
            Nutrient::Ammonium => "nh4",
            Nutrient::Phosphate => "pi",
        }
    }
}

/// Medium configuration: how condition rows translate into exchange bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediumConfig {
    /// nutrient name -> exchange reaction id. Acetate and ammonium entries
    /// are required (validated at load).
    pub exchanges: BTreeMap<String, String>,
    #[serde(default)]
    pub scaling: ScalingConfig,
    /// Static bounds applied to every condition before the
    /// condition-dependent caps; reaction ids absent from the model are
    /// skipped with a warning.
    #[serde(default)]
    pub base_bounds: BTreeMap<String, BoundsEntry>,
    #[serde(default)]
    pub yeast_extract: YeastExtractConfig,
}

impl MediumConfig {
    pub fn exchange_for(&self, nutrient: Nutrient) -> Option<&str> {
        self.exchanges.get(nutrient.key()).map(String::as_str)
    }
}

/// Uptake scaling coefficients (uptake_max = k * concentration).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScalingConfig {
    #[serde(default)]
    pub k_ac: f64,
    #[serde(default)]
    pub k_nh4: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct BoundsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ub: Option<f64>,
}

/// Yeast-extract supplement toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YeastExtractConfig {
    /// Threshold concentration (g/L) above which the supplement counts as
    /// present.
    #[serde(rename = "enabled_if_gL_gt", default)]
    pub enabled_if_g_l_gt: f64,
    /// Lower bound opened on each auxiliary exchange when enabled.
    #[serde(default = "default_open_uptake_lb")]
    pub open_uptake_lb: f64,
    #[serde(default)]
    pub open_exchanges_when_enabled: Vec<String>,
}

fn default_open_uptake_lb() -> f64 {
    -1.0
}

impl Default for YeastExtractConfig {
    fn default() -> Self {
        Self {
            enabled_if_g_l_gt: 0.0,
            open_uptake_lb: default_open_uptake_lb(),
            open_exchanges_when_enabled: Vec::new(),
        }
    }
}

/// Regime configuration: candidate reaction ids per tracked nutrient, tried
/// in order until one exists in the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RegimeConfig {
    #[serde(default)]
    pub acetate: Vec<String>,
    #[serde(default)]
    pub oxygen: Vec<String>,
    #[serde(default)]
    pub ammonium: Vec<String>,
    #[serde(default)]
    pub phosphate: Vec<String>,
}

impl RegimeConfig {
    pub fn candidates(&self, nutrient: Nutrient) -> &[String] {
        match nutrient {
            Nutrient::Acetate => &self.acetate,
            Nutrient::Oxygen => &self.oxygen,
            Nutrient::Ammonium => &self.ammonium,
            Nutrient::Phosphate => &self.phosphate,
        }
    }
}
