//! Config validation logic.
//!
//! All schema-level requirements are enforced here, once, right after
//! deserialization; pipeline code downstream can rely on a valid config.

use crate::schema::{MediumConfig, RegimeConfig};
use crate::ConfigError;

pub fn validate_medium(config: &MediumConfig) -> Result<(), ConfigError> {
    if config.exchanges.is_empty() {
        return Err(ConfigError::EmptyExchanges);
    }
    for nutrient in ["acetate", "ammonium"] {
        match config.exchanges.get(nutrient) {
            Some(rid) if !rid.trim().is_empty() => {}
            _ => return Err(ConfigError::MissingExchange { nutrient }),
        }
    }

    for (field, value) in [
        ("scaling.k_ac", config.scaling.k_ac),
        ("scaling.k_nh4", config.scaling.k_nh4),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be non-negative and finite".to_string(),
            });
        }
    }

    for (rxn_id, entry) in &config.base_bounds {
        if let (Some(lb), Some(ub)) = (entry.lb, entry.ub) {
            if lb > ub {
                return Err(ConfigError::InvalidValue {
                    field: format!("base_bounds.{rxn_id}"),
                    value: format!("lb={lb}, ub={ub}"),
                    reason: "lb must not exceed ub".to_string(),
                });
            }
        }
        for (side, value) in [("lb", entry.lb), ("ub", entry.ub)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("base_bounds.{rxn_id}.{side}"),
                        value: v.to_string(),
                        reason: "must be finite".to_string(),
                    });
                }
            }
        }
    }

    let ye = &config.yeast_extract;
    if !ye.open_uptake_lb.is_finite() || ye.open_uptake_lb > 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "yeast_extract.open_uptake_lb".to_string(),
            value: ye.open_uptake_lb.to_string(),
            reason: "must be finite and non-positive (uptake is negative flux)".to_string(),
        });
    }
    if !ye.enabled_if_g_l_gt.is_finite() {
        return Err(ConfigError::InvalidValue {
            field: "yeast_extract.enabled_if_gL_gt".to_string(),
            value: ye.enabled_if_g_l_gt.to_string(),
            reason: "must be finite".to_string(),
        });
    }

    Ok(())
}

pub fn validate_regime(config: &RegimeConfig) -> Result<(), ConfigError> {
    for (field, candidates) in [
        ("acetate", &config.acetate),
        ("oxygen", &config.oxygen),
        ("ammonium", &config.ammonium),
        ("phosphate", &config.phosphate),
    ] {
        for rid in candidates {
            if rid.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: String::new(),
                    reason: "candidate reaction id must be non-empty".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BoundsEntry, ScalingConfig, YeastExtractConfig};
    use std::collections::BTreeMap;

    fn minimal_medium() -> MediumConfig {
        let mut exchanges = BTreeMap::new();
        exchanges.insert("acetate".to_string(), "EX_ac_e".to_string());
        exchanges.insert("ammonium".to_string(), "EX_nh4_e".to_string());
        MediumConfig {
            exchanges,
            scaling: ScalingConfig {
                k_ac: 0.05,
                k_nh4: 0.3,
            },
            base_bounds: BTreeMap::new(),
            yeast_extract: YeastExtractConfig::default(),
        }
    }

    #[test]
    fn minimal_medium_is_valid() {
        validate_medium(&minimal_medium()).unwrap();
    }

    #[test]
    fn missing_ammonium_exchange_rejected() {
        let mut config = minimal_medium();
        config.exchanges.remove("ammonium");
        let err = validate_medium(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingExchange {
                nutrient: "ammonium"
            }
        ));
    }

    #[test]
    fn empty_exchanges_rejected() {
        let mut config = minimal_medium();
        config.exchanges.clear();
        assert!(matches!(
            validate_medium(&config).unwrap_err(),
            ConfigError::EmptyExchanges
        ));
    }

    #[test]
    fn inverted_base_bounds_rejected() {
        let mut config = minimal_medium();
        config.base_bounds.insert(
            "EX_o2_e".to_string(),
            BoundsEntry {
                lb: Some(5.0),
                ub: Some(-5.0),
            },
        );
        assert!(validate_medium(&config).is_err());
    }

    #[test]
    fn positive_open_uptake_lb_rejected() {
        let mut config = minimal_medium();
        config.yeast_extract.open_uptake_lb = 1.0;
        assert!(validate_medium(&config).is_err());
    }
}
