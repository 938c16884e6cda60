//! Dense bounded-variable primal simplex.
//!
//! Two-phase method over the equality form `A x = b`, `l <= x <= u`:
//! phase 1 drives artificial variables to zero, phase 2 maximizes the given
//! cost. Entering and leaving choices follow Bland's rule, so degenerate
//! pivots cannot cycle. The basis is refactorized every iteration, which is
//! cheap at the reduced-network sizes this pipeline solves.

use crate::lp::Lp;
use crate::{SolveStatus, SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

const COST_TOL: f64 = 1e-9;
const PIVOT_TOL: f64 = 1e-9;
const RATIO_TIE_TOL: f64 = 1e-9;
const FEAS_TOL: f64 = 1e-7;

#[derive(Debug, Clone)]
pub(crate) struct LpOutcome {
    pub status: SolveStatus,
    /// Variable values (reaction variables first). Empty unless optimal.
    pub x: Vec<f64>,
    pub objective: f64,
}

impl LpOutcome {
    fn non_optimal(status: SolveStatus) -> Self {
        Self {
            status,
            x: Vec::new(),
            objective: f64::NAN,
        }
    }
}

/// Maximize `cost · x` over the LP.
pub(crate) fn maximize(lp: &Lp, cost: &DVector<f64>) -> SolverResult<LpOutcome> {
    let m = lp.a.nrows();
    let n = lp.a.ncols();

    if m == 0 {
        // no balance rows: every variable sits at whichever bound the cost
        // prefers
        let mut x = vec![0.0; n];
        let mut objective = 0.0;
        for j in 0..n {
            x[j] = if cost[j] > 0.0 { lp.upper[j] } else { lp.lower[j] };
            objective += cost[j] * x[j];
        }
        return Ok(LpOutcome {
            status: SolveStatus::Optimal,
            x,
            objective,
        });
    }

    // Augment with one artificial per row. Nonbasic originals start at their
    // lower bound; each artificial absorbs the signed residual so the
    // initial basis (the artificial identity block) is feasible.
    let total = n + m;
    let mut at_upper = vec![false; total];
    let x_init: DVector<f64> = lp.lower.clone();
    let residual = &lp.b - &lp.a * &x_init;

    let mut aug = DMatrix::zeros(m, total);
    aug.view_mut((0, 0), (m, n)).copy_from(&lp.a);
    let mut lower = DVector::zeros(total);
    let mut upper = DVector::zeros(total);
    lower.rows_mut(0, n).copy_from(&lp.lower);
    upper.rows_mut(0, n).copy_from(&lp.upper);
    for i in 0..m {
        let sign = if residual[i] < 0.0 { -1.0 } else { 1.0 };
        aug[(i, n + i)] = sign;
        lower[n + i] = 0.0;
        upper[n + i] = residual[i].abs();
    }
    let mut basis: Vec<usize> = (n..total).collect();

    // Phase 1: maximize -(sum of artificials).
    let mut phase1_cost = DVector::zeros(total);
    for j in n..total {
        phase1_cost[j] = -1.0;
    }
    let state = iterate(&aug, &lp.b, &lower, &upper, &phase1_cost, &mut basis, &mut at_upper)?;
    let infeasibility: f64 = (n..total).map(|j| state.x[j]).sum();
    if infeasibility > FEAS_TOL {
        return Ok(LpOutcome::non_optimal(SolveStatus::Infeasible));
    }

    // Pin artificials at zero for phase 2 (degenerate ones may stay basic).
    for j in n..total {
        upper[j] = 0.0;
    }

    let mut phase2_cost = DVector::zeros(total);
    phase2_cost.rows_mut(0, n).copy_from(cost);
    let state = iterate(&aug, &lp.b, &lower, &upper, &phase2_cost, &mut basis, &mut at_upper)?;
    if state.unbounded {
        return Ok(LpOutcome::non_optimal(SolveStatus::Unbounded));
    }

    let x: Vec<f64> = state.x.iter().take(n).copied().collect();
    let objective = (0..n).map(|j| cost[j] * x[j]).sum();
    Ok(LpOutcome {
        status: SolveStatus::Optimal,
        x,
        objective,
    })
}

struct IterateState {
    x: DVector<f64>,
    unbounded: bool,
}

/// Run simplex pivots to optimality (or detect an unbounded ray).
fn iterate(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    lower: &DVector<f64>,
    upper: &DVector<f64>,
    cost: &DVector<f64>,
    basis: &mut Vec<usize>,
    at_upper: &mut [bool],
) -> SolverResult<IterateState> {
    let m = a.nrows();
    let total = a.ncols();
    let max_iters = 200 * (total + m) + 1000;

    let mut in_basis = vec![false; total];
    for &j in basis.iter() {
        in_basis[j] = true;
    }

    for _ in 0..max_iters {
        // Current point: nonbasic at their recorded bound, basics solved.
        let mut x = DVector::zeros(total);
        for j in 0..total {
            if !in_basis[j] {
                x[j] = if at_upper[j] { upper[j] } else { lower[j] };
            }
        }
        let mut rhs = b.clone();
        for j in 0..total {
            if !in_basis[j] && x[j] != 0.0 {
                rhs -= a.column(j) * x[j];
            }
        }
        let bmat = DMatrix::from_fn(m, m, |i, k| a[(i, basis[k])]);
        let lu = bmat.clone().lu();
        let xb = lu.solve(&rhs).ok_or_else(|| SolverError::Numerical {
            what: "singular basis matrix".to_string(),
        })?;
        for (k, &j) in basis.iter().enumerate() {
            x[j] = xb[k];
        }

        // Duals and reduced costs.
        let cb = DVector::from_fn(m, |k, _| cost[basis[k]]);
        let y = bmat.transpose().lu().solve(&cb).ok_or_else(|| {
            SolverError::Numerical {
                what: "singular basis matrix (transpose)".to_string(),
            }
        })?;

        // Entering variable: Bland (first eligible index).
        let mut entering: Option<(usize, f64)> = None;
        for j in 0..total {
            if in_basis[j] || upper[j] - lower[j] <= PIVOT_TOL {
                continue;
            }
            let d = cost[j] - y.dot(&a.column(j).clone_owned());
            if !at_upper[j] && d > COST_TOL {
                entering = Some((j, 1.0));
                break;
            }
            if at_upper[j] && d < -COST_TOL {
                entering = Some((j, -1.0));
                break;
            }
        }
        let Some((enter, dir)) = entering else {
            return Ok(IterateState { x, unbounded: false });
        };

        // Ratio test: movement t >= 0 of the entering variable, limited by
        // its own opposite bound (a bound flip) and by each basic variable
        // hitting one of its bounds. Ties break to the smallest variable
        // index (Bland).
        let w = lu
            .solve(&a.column(enter).clone_owned())
            .ok_or_else(|| SolverError::Numerical {
                what: "singular basis matrix (direction)".to_string(),
            })?;

        let mut best_t = upper[enter] - lower[enter];
        let mut best_var = enter; // flip candidate
        let mut leave: Option<usize> = None;
        for k in 0..m {
            let delta = dir * w[k];
            let j = basis[k];
            let t = if delta > PIVOT_TOL {
                (x[j] - lower[j]) / delta
            } else if delta < -PIVOT_TOL {
                (upper[j] - x[j]) / (-delta)
            } else {
                continue;
            };
            let t = t.max(0.0);
            if t < best_t - RATIO_TIE_TOL
                || (t <= best_t + RATIO_TIE_TOL && j < best_var)
            {
                best_t = t;
                best_var = j;
                leave = Some(k);
            }
        }

        if best_t > 1.0e29 {
            return Ok(IterateState { x, unbounded: true });
        }

        match leave {
            None => {
                // bound flip: entering variable crosses to its other bound
                at_upper[enter] = !at_upper[enter];
            }
            Some(k) => {
                let leaving = basis[k];
                let delta = dir * w[k];
                in_basis[leaving] = false;
                in_basis[enter] = true;
                // leaving variable parks at the bound it ran into
                at_upper[leaving] = delta < -PIVOT_TOL;
                basis[k] = enter;
            }
        }
    }

    Err(SolverError::Numerical {
        what: "simplex iteration limit reached".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fr_model::{ConstraintModel, Reaction};

    fn chain_model() -> ConstraintModel {
        // EX_a (uptake of a) -> CONV (a -> b) -> SINK_b, growth on CONV
        ConstraintModel::from_reactions(
            Some("chain".to_string()),
            vec![
                Reaction::new("EX_a", -5.0, 0.0)
                    .with_metabolites(vec![("a".to_string(), -1.0)]),
                Reaction::new("CONV", 0.0, 1000.0)
                    .with_metabolites(vec![("a".to_string(), -1.0), ("b".to_string(), 1.0)])
                    .with_objective(1.0),
                Reaction::new("SINK_b", 0.0, 1000.0)
                    .with_metabolites(vec![("b".to_string(), -1.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn chain_throughput_limited_by_uptake() {
        let lp = Lp::from_model(&chain_model());
        let out = maximize(&lp, &lp.objective_cost()).unwrap();
        assert_eq!(out.status, SolveStatus::Optimal);
        assert!((out.objective - 5.0).abs() < 1e-6);
        // uptake runs at its cap
        let j = lp.var_of_rxn["EX_a"];
        assert!((out.x[j] - (-5.0)).abs() < 1e-6);
    }

    #[test]
    fn conflicting_pins_are_infeasible() {
        // CONV pinned above what uptake allows
        let model = ConstraintModel::from_reactions(
            None,
            vec![
                Reaction::new("EX_a", -5.0, 0.0)
                    .with_metabolites(vec![("a".to_string(), -1.0)]),
                Reaction::new("CONV", 10.0, 10.0)
                    .with_metabolites(vec![("a".to_string(), -1.0), ("b".to_string(), 1.0)])
                    .with_objective(1.0),
                Reaction::new("SINK_b", 0.0, 1000.0)
                    .with_metabolites(vec![("b".to_string(), -1.0)]),
            ],
        )
        .unwrap();
        let lp = Lp::from_model(&model);
        let out = maximize(&lp, &lp.objective_cost()).unwrap();
        assert_eq!(out.status, SolveStatus::Infeasible);
    }

    #[test]
    fn no_balance_rows_puts_vars_at_preferred_bounds() {
        let model = ConstraintModel::from_reactions(
            None,
            vec![
                Reaction::new("V1", -2.0, 3.0).with_objective(1.0),
                Reaction::new("V2", -4.0, 1.0).with_objective(-1.0),
            ],
        )
        .unwrap();
        let lp = Lp::from_model(&model);
        let out = maximize(&lp, &lp.objective_cost()).unwrap();
        assert_eq!(out.status, SolveStatus::Optimal);
        assert!((out.objective - 7.0).abs() < 1e-9);
    }
}
