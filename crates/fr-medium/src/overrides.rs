//! Fixed-flux overrides (`--rxn-fix RXNID=value`).

use crate::{MediumError, MediumResult};
use fr_model::ConstraintModel;

/// Pin one reaction's flux: `lower_bound = upper_bound = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxOverride {
    pub reaction_id: String,
    pub value: f64,
}

/// Parse raw `--rxn-fix` flags like `["ATPM=20", "EX_o2_e=-10"]`.
pub fn parse_rxn_fix(items: &[String]) -> MediumResult<Vec<FluxOverride>> {
    let mut out = Vec::new();
    for raw in items {
        let s = raw.trim();
        if s.is_empty() {
            continue;
        }
        let Some((rid, val)) = s.split_once('=') else {
            return Err(MediumError::InvalidOverride {
                what: format!("must be in form RXNID=value, got: {s:?}"),
            });
        };
        let rid = rid.trim();
        if rid.is_empty() {
            return Err(MediumError::InvalidOverride {
                what: format!("empty reaction id: {s:?}"),
            });
        }
        let value = val
            .trim()
            .parse::<f64>()
            .map_err(|_| MediumError::InvalidOverride {
                what: format!("non-numeric value: {s:?}"),
            })?;
        out.push(FluxOverride {
            reaction_id: rid.to_string(),
            value,
        });
    }
    Ok(out)
}

/// Apply overrides to the model. Reactions absent from the model are logged
/// and skipped; they never fail the run.
pub fn apply_flux_overrides(
    model: &mut ConstraintModel,
    overrides: &[FluxOverride],
) -> MediumResult<()> {
    for o in overrides {
        if !model.contains(&o.reaction_id) {
            tracing::warn!(
                rxn_id = %o.reaction_id,
                "reaction not found for flux override (skipped)"
            );
            continue;
        }
        // set_bounds orders the two mutations so the pin cannot transit
        // through lb > ub
        model.set_bounds(&o.reaction_id, o.value, o.value)?;
        tracing::info!(rxn_id = %o.reaction_id, value = o.value, "fixed flux");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_overrides() {
        let items = vec!["ATPM=20".to_string(), " EX_o2_e = -10.5 ".to_string()];
        let parsed = parse_rxn_fix(&items).unwrap();
        assert_eq!(
            parsed,
            vec![
                FluxOverride {
                    reaction_id: "ATPM".to_string(),
                    value: 20.0
                },
                FluxOverride {
                    reaction_id: "EX_o2_e".to_string(),
                    value: -10.5
                },
            ]
        );
    }

    #[test]
    fn skips_blank_entries() {
        let items = vec!["".to_string(), "  ".to_string()];
        assert!(parse_rxn_fix(&items).unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_entries() {
        for bad in ["ATPM", "=20", "ATPM=abc"] {
            let err = parse_rxn_fix(&[bad.to_string()]).unwrap_err();
            assert!(matches!(err, MediumError::InvalidOverride { .. }), "{bad}");
        }
    }
}
