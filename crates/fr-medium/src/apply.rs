//! Applying one condition to a constraint model.

use crate::{MediumError, MediumResult};
use fr_config::{Condition, MediumConfig, Nutrient};
use fr_model::ConstraintModel;

/// One audited bound mutation. No-op updates (old == new) are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundChange {
    pub reaction_id: String,
    pub old_lb: f64,
    pub old_ub: f64,
    pub new_lb: f64,
    pub new_ub: f64,
}

/// Records what a condition changed on the model, for traceability.
///
/// `ph0` is carried as metadata only; it is never turned into a constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct MediumApplyResult {
    pub condition_id: String,
    pub ph0: Option<f64>,
    pub yeast_enabled: bool,
    pub changed_bounds: Vec<BoundChange>,
}

/// Apply one experimental condition to the model by updating exchange
/// bounds.
///
/// Three steps, in order:
/// 1. base-medium bounds (best-effort; unknown reactions warn and skip),
/// 2. condition-scaled uptake caps for acetate and ammonium (required;
///    unknown target reactions fail loud),
/// 3. yeast-extract toggle opening auxiliary exchanges (best-effort).
///
/// Mutates `model` in place and returns the complete audit trail.
pub fn apply_condition(
    model: &mut ConstraintModel,
    condition: &Condition,
    config: &MediumConfig,
) -> MediumResult<MediumApplyResult> {
    // Loaded configs are validated already; re-check here so a hand-built
    // config cannot bypass the contract.
    if config.exchanges.is_empty() {
        return Err(MediumError::Config {
            what: "exchanges must be a non-empty mapping".to_string(),
        });
    }
    let ac_exchange = config
        .exchange_for(Nutrient::Acetate)
        .ok_or_else(|| missing_exchange("acetate"))?;
    let nh4_exchange = config
        .exchange_for(Nutrient::Ammonium)
        .ok_or_else(|| missing_exchange("ammonium"))?;

    let mut changes: Vec<BoundChange> = Vec::new();

    // 1) base medium bounds (if present)
    for (rxn_id, entry) in &config.base_bounds {
        try_set_bounds(model, rxn_id, entry.lb, entry.ub, &mut changes)?;
    }

    // 2) condition-specific scaling updates
    if let Some(acetate_mm) = condition.acetate_mm {
        let uptake_max = (config.scaling.k_ac * acetate_mm).max(0.0);
        set_uptake_cap(model, ac_exchange, uptake_max, &mut changes)?;
    }
    if let Some(nh4cl_g_l) = condition.nh4cl_g_l {
        let uptake_max = (config.scaling.k_nh4 * nh4cl_g_l).max(0.0);
        set_uptake_cap(model, nh4_exchange, uptake_max, &mut changes)?;
    }

    // 3) yeast extract: toggle + open exchanges (optional)
    let ye = &config.yeast_extract;
    let yeast_enabled = condition
        .yeast_extract_g_l
        .map(|g_l| g_l > ye.enabled_if_g_l_gt)
        .unwrap_or(false);
    if yeast_enabled {
        for rxn_id in &ye.open_exchanges_when_enabled {
            try_set_bounds(model, rxn_id, Some(ye.open_uptake_lb), None, &mut changes)?;
        }
    }

    if let Some(ph0) = condition.ph0 {
        tracing::info!(
            condition_id = %condition.condition_id,
            ph0,
            "condition metadata pH0 (not applied to constraints)"
        );
    }

    Ok(MediumApplyResult {
        condition_id: condition.condition_id.clone(),
        ph0: condition.ph0,
        yeast_enabled,
        changed_bounds: changes,
    })
}

fn missing_exchange(nutrient: &str) -> MediumError {
    MediumError::Config {
        what: format!("exchanges must include key: {nutrient}"),
    }
}

/// Set bounds with audit logging; `None` keeps the existing side.
fn set_bounds_logged(
    model: &mut ConstraintModel,
    rxn_id: &str,
    lb: Option<f64>,
    ub: Option<f64>,
    changes: &mut Vec<BoundChange>,
) -> MediumResult<()> {
    let (old_lb, old_ub) = model
        .bounds(rxn_id)
        .map_err(|_| MediumError::UnknownReaction {
            id: rxn_id.to_string(),
        })?;
    let new_lb = lb.unwrap_or(old_lb);
    let new_ub = ub.unwrap_or(old_ub);
    if new_lb == old_lb && new_ub == old_ub {
        return Ok(());
    }
    model.set_bounds(rxn_id, new_lb, new_ub)?;
    tracing::info!(
        rxn_id,
        old_lb,
        new_lb,
        old_ub,
        new_ub,
        "bound update"
    );
    changes.push(BoundChange {
        reaction_id: rxn_id.to_string(),
        old_lb,
        old_ub,
        new_lb,
        new_ub,
    });
    Ok(())
}

/// Like [`set_bounds_logged`] but does not hard-fail if the reaction is
/// missing. Intended for optional base-medium bounds and optional
/// yeast-extract exchanges.
fn try_set_bounds(
    model: &mut ConstraintModel,
    rxn_id: &str,
    lb: Option<f64>,
    ub: Option<f64>,
    changes: &mut Vec<BoundChange>,
) -> MediumResult<()> {
    if !model.contains(rxn_id) {
        tracing::warn!(rxn_id, "reaction not found in model (skipped)");
        return Ok(());
    }
    set_bounds_logged(model, rxn_id, lb, ub, changes)
}

/// Set a maximum uptake for an exchange reaction using the standard
/// convention: uptake is negative flux, so `lower_bound = -uptake_max`.
///
/// A pre-existing negative upper bound (forced secretion) is clamped to 0
/// so the new lower bound cannot cross it; if the cap would still invert
/// the bounds the upper bound is clamped to 0 (uptake-only).
fn set_uptake_cap(
    model: &mut ConstraintModel,
    rxn_id: &str,
    uptake_max: f64,
    changes: &mut Vec<BoundChange>,
) -> MediumResult<()> {
    let (old_lb, old_ub) = model
        .bounds(rxn_id)
        .map_err(|_| MediumError::UnknownReaction {
            id: rxn_id.to_string(),
        })?;

    let u = uptake_max.max(0.0);
    let new_lb = -u;
    let mut new_ub = old_ub;
    if new_ub < 0.0 {
        new_ub = 0.0;
    }
    if new_lb > new_ub {
        // bounds must stay consistent
        new_ub = 0.0;
    }

    if new_lb == old_lb && new_ub == old_ub {
        return Ok(());
    }
    model.set_bounds(rxn_id, new_lb, new_ub)?;
    tracing::info!(
        rxn_id,
        uptake_max = u,
        old_lb,
        new_lb,
        old_ub,
        new_ub,
        "exchange uptake cap"
    );
    changes.push(BoundChange {
        reaction_id: rxn_id.to_string(),
        old_lb,
        old_ub,
        new_lb,
        new_ub,
    });
    Ok(())
}
