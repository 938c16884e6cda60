//! Saturation classification.

use fr_config::{Condition, MediumConfig, Nutrient};

/// Tolerance on |mid - applied_bound| for the range-based classifier.
pub const DEFAULT_SAT_TOL: f64 = 1e-3;
/// Tolerance on |width| for the range-based classifier.
pub const DEFAULT_WIDTH_TOL: f64 = 1e-3;
/// Tolerance on flux-vs-bound agreement for the single-solution side check.
pub const DEFAULT_EPS: f64 = 1e-6;
/// |bound| at or beyond this is treated as open (effectively unconstrained).
pub const DEFAULT_INFTY_BOUND: f64 = 999.0;

/// Tri-state saturation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saturation {
    Saturated,
    NotSaturated,
    Unknown,
}

impl Saturation {
    /// CSV field: `true` / `false` / empty for unknown, keeping the
    /// downstream table shape stable.
    pub fn as_csv_field(self) -> &'static str {
        match self {
            Saturation::Saturated => "true",
            Saturation::NotSaturated => "false",
            Saturation::Unknown => "",
        }
    }
}

/// Which bound the optimum sits on, for the single-solution check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatSide {
    Lower,
    Upper,
    /// lb == ub and the flux sits on both.
    Fixed,
    /// Both bounds effectively infinite; limitation is meaningless.
    Open,
    /// Constrained but the flux sits strictly inside the bounds.
    None,
    /// No reaction was resolved for the nutrient.
    Missing,
}

impl SatSide {
    pub fn as_str(self) -> &'static str {
        match self {
            SatSide::Lower => "lb",
            SatSide::Upper => "ub",
            SatSide::Fixed => "fixed",
            SatSide::Open => "open",
            SatSide::None => "none",
            SatSide::Missing => "missing",
        }
    }
}

/// Per-(condition, nutrient) saturation summary from one FBA solution.
#[derive(Debug, Clone, PartialEq)]
pub struct SaturationResult {
    pub rid: String,
    pub flux: f64,
    pub lb: f64,
    pub ub: f64,
    pub is_constrained: bool,
    pub saturated: Saturation,
    pub sat_side: SatSide,
}

impl SaturationResult {
    /// Placeholder row for a nutrient with no resolvable reaction.
    pub fn missing() -> Self {
        Self {
            rid: String::new(),
            flux: f64::NAN,
            lb: f64::NAN,
            ub: f64::NAN,
            is_constrained: false,
            saturated: Saturation::Unknown,
            sat_side: SatSide::Missing,
        }
    }
}

/// Range-based saturation classifier.
///
/// Saturated iff the range midpoint sits on the applied bound AND the whole
/// feasible range has collapsed there. The midpoint condition alone is not
/// enough: the optimum can rest on a bound by coincidence of the current
/// optimal vertex while alternate optima still have slack.
pub fn classify(
    mid: Option<f64>,
    width: Option<f64>,
    applied_bound: Option<f64>,
    sat_tol: f64,
    width_tol: f64,
) -> Saturation {
    let Some(bound) = applied_bound else {
        return Saturation::Unknown;
    };
    let (Some(mid), Some(width)) = (mid, width) else {
        return Saturation::Unknown;
    };
    if mid.is_nan() || width.is_nan() {
        return Saturation::Unknown;
    }
    if (mid - bound).abs() <= sat_tol && width.abs() <= width_tol {
        Saturation::Saturated
    } else {
        Saturation::NotSaturated
    }
}

/// Single-solution saturation: where does the optimal flux sit relative to
/// the reaction's bounds?
pub fn saturation_for_reaction(
    rid: &str,
    flux: f64,
    lb: f64,
    ub: f64,
    eps: f64,
    infty_bound: f64,
) -> SaturationResult {
    let open = lb <= -infty_bound && ub >= infty_bound;
    if open {
        return SaturationResult {
            rid: rid.to_string(),
            flux,
            lb,
            ub,
            is_constrained: false,
            saturated: Saturation::NotSaturated,
            sat_side: SatSide::Open,
        };
    }

    // at least one finite side: meaningful for limitation
    let (saturated, sat_side) = if (lb - ub).abs() <= eps && (flux - lb).abs() <= eps {
        (Saturation::Saturated, SatSide::Fixed)
    } else if (flux - lb).abs() <= eps {
        (Saturation::Saturated, SatSide::Lower)
    } else if (flux - ub).abs() <= eps {
        (Saturation::Saturated, SatSide::Upper)
    } else {
        (Saturation::NotSaturated, SatSide::None)
    };

    SaturationResult {
        rid: rid.to_string(),
        flux,
        lb,
        ub,
        is_constrained: true,
        saturated,
        sat_side,
    }
}

/// Resolve the condition-specific applied bound (uptake cap) for a nutrient.
///
/// Acetate and ammonium scale with the condition's concentrations; oxygen
/// and phosphate fall back to the static base-bounds entry of their mapped
/// exchange. `None` when the nutrient has no mapping or the inputs needed
/// to compute the bound are absent.
pub fn applied_bound(
    config: &MediumConfig,
    condition: &Condition,
    nutrient: Nutrient,
) -> Option<f64> {
    let rxn_id = config.exchange_for(nutrient)?;
    if rxn_id.trim().is_empty() {
        return None;
    }
    match nutrient {
        Nutrient::Acetate => condition
            .acetate_mm
            .map(|c| -(config.scaling.k_ac * c).max(0.0)),
        Nutrient::Ammonium => condition
            .nh4cl_g_l
            .map(|c| -(config.scaling.k_nh4 * c).max(0.0)),
        Nutrient::Oxygen | Nutrient::Phosphate => config.base_bounds.get(rxn_id)?.lb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bound_means_unknown() {
        assert_eq!(
            classify(Some(0.0), Some(0.0), None, DEFAULT_SAT_TOL, DEFAULT_WIDTH_TOL),
            Saturation::Unknown
        );
    }

    #[test]
    fn missing_features_mean_unknown() {
        assert_eq!(
            classify(None, Some(0.0), Some(-0.5), DEFAULT_SAT_TOL, DEFAULT_WIDTH_TOL),
            Saturation::Unknown
        );
        assert_eq!(
            classify(
                Some(f64::NAN),
                Some(0.0),
                Some(-0.5),
                DEFAULT_SAT_TOL,
                DEFAULT_WIDTH_TOL
            ),
            Saturation::Unknown
        );
    }

    #[test]
    fn exact_pin_is_saturated() {
        assert_eq!(
            classify(
                Some(-0.5),
                Some(0.0),
                Some(-0.5),
                DEFAULT_SAT_TOL,
                DEFAULT_WIDTH_TOL
            ),
            Saturation::Saturated
        );
    }

    #[test]
    fn mid_on_bound_with_wide_range_is_not_saturated() {
        // the coincidental-vertex case the width condition exists for
        assert_eq!(
            classify(
                Some(-0.5),
                Some(2.0),
                Some(-0.5),
                DEFAULT_SAT_TOL,
                DEFAULT_WIDTH_TOL
            ),
            Saturation::NotSaturated
        );
    }

    #[test]
    fn two_sat_tol_off_bound_is_not_saturated() {
        let bound = -0.5;
        let mid = bound + 2.0 * DEFAULT_SAT_TOL;
        assert_eq!(
            classify(
                Some(mid),
                Some(0.0),
                Some(bound),
                DEFAULT_SAT_TOL,
                DEFAULT_WIDTH_TOL
            ),
            Saturation::NotSaturated
        );
    }

    #[test]
    fn side_classification() {
        let open =
            saturation_for_reaction("R", 3.0, -1000.0, 1000.0, DEFAULT_EPS, DEFAULT_INFTY_BOUND);
        assert_eq!(open.sat_side, SatSide::Open);
        assert!(!open.is_constrained);

        let fixed =
            saturation_for_reaction("R", 8.39, 8.39, 8.39, DEFAULT_EPS, DEFAULT_INFTY_BOUND);
        assert_eq!(fixed.sat_side, SatSide::Fixed);
        assert_eq!(fixed.saturated, Saturation::Saturated);

        let lower =
            saturation_for_reaction("R", -0.5, -0.5, 0.0, DEFAULT_EPS, DEFAULT_INFTY_BOUND);
        assert_eq!(lower.sat_side, SatSide::Lower);

        let upper =
            saturation_for_reaction("R", 10.0, -20.0, 10.0, DEFAULT_EPS, DEFAULT_INFTY_BOUND);
        assert_eq!(upper.sat_side, SatSide::Upper);

        let inside =
            saturation_for_reaction("R", 1.0, -20.0, 10.0, DEFAULT_EPS, DEFAULT_INFTY_BOUND);
        assert_eq!(inside.sat_side, SatSide::None);
        assert_eq!(inside.saturated, Saturation::NotSaturated);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// An undefined applied bound dominates every mid/width combination.
        #[test]
        fn unknown_without_bound(mid in -1000.0_f64..1000.0, width in -1000.0_f64..1000.0) {
            prop_assert_eq!(
                classify(Some(mid), Some(width), None, DEFAULT_SAT_TOL, DEFAULT_WIDTH_TOL),
                Saturation::Unknown
            );
        }

        /// Saturated requires BOTH the mid condition and the width condition.
        #[test]
        fn saturated_requires_both_conditions(
            bound in -100.0_f64..0.0,
            mid_off in -1.0_f64..1.0,
            width in 0.0_f64..1.0,
        ) {
            let mid = bound + mid_off;
            let verdict = classify(
                Some(mid),
                Some(width),
                Some(bound),
                DEFAULT_SAT_TOL,
                DEFAULT_WIDTH_TOL,
            );
            let expect = (mid - bound).abs() <= DEFAULT_SAT_TOL && width.abs() <= DEFAULT_WIDTH_TOL;
            prop_assert_eq!(verdict == Saturation::Saturated, expect);
        }
    }
}
