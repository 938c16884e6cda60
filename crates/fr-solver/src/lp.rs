//! LP assembly from a constraint model.
//!
//! Variables are reactions (bounds from the model); one equality row per
//! metabolite enforces steady state (`S v = 0`). The objective-floor
//! extension used by flux variability adds one row `c·v - s = t` with a
//! non-negative slack, which turns `c·v >= t` into equality form.

use fr_model::ConstraintModel;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

/// Upper bound given to the objective-floor slack. Far above any flux sum a
/// bounded network can produce.
const FLOOR_SLACK_UB: f64 = 1.0e9;

/// Dense equality-form LP: `A x = b`, `lower <= x <= upper`.
#[derive(Debug, Clone)]
pub(crate) struct Lp {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
    /// Objective coefficients of the model (reaction variables only).
    pub objective: DVector<f64>,
    /// Variable index per reaction id, in model order.
    pub var_of_rxn: BTreeMap<String, usize>,
    /// Number of reaction variables (extensions append after these).
    pub n_rxns: usize,
}

impl Lp {
    pub fn from_model(model: &ConstraintModel) -> Self {
        let n = model.len();

        // deterministic metabolite row order: sorted by metabolite id, so the
        // row layout is a function of the model content alone
        let met_ids: std::collections::BTreeSet<&str> = model
            .reactions()
            .iter()
            .flat_map(|r| r.metabolites.iter().map(|(met, _)| met.as_str()))
            .collect();
        let rows: BTreeMap<&str, usize> = met_ids
            .into_iter()
            .enumerate()
            .map(|(i, met)| (met, i))
            .collect();
        let m = rows.len();

        let mut a = DMatrix::zeros(m, n);
        let mut lower = DVector::zeros(n);
        let mut upper = DVector::zeros(n);
        let mut objective = DVector::zeros(n);
        let mut var_of_rxn = BTreeMap::new();

        for (j, rxn) in model.reactions().iter().enumerate() {
            lower[j] = rxn.lower_bound;
            upper[j] = rxn.upper_bound;
            objective[j] = rxn.objective_coefficient;
            var_of_rxn.insert(rxn.id.clone(), j);
            for (met, coeff) in &rxn.metabolites {
                let i = rows[met.as_str()];
                a[(i, j)] += coeff;
            }
        }

        Lp {
            a,
            b: DVector::zeros(m),
            lower,
            upper,
            objective,
            var_of_rxn,
            n_rxns: n,
        }
    }

    /// Return a copy extended with the row `objective · v - s = floor`,
    /// `0 <= s <= FLOOR_SLACK_UB`.
    pub fn with_objective_floor(&self, floor: f64) -> Self {
        let m = self.a.nrows();
        let n = self.a.ncols();

        let mut a = DMatrix::zeros(m + 1, n + 1);
        a.view_mut((0, 0), (m, n)).copy_from(&self.a);
        for j in 0..self.n_rxns {
            a[(m, j)] = self.objective[j];
        }
        a[(m, n)] = -1.0;

        let mut b = DVector::zeros(m + 1);
        b.rows_mut(0, m).copy_from(&self.b);
        b[m] = floor;

        let mut lower = DVector::zeros(n + 1);
        lower.rows_mut(0, n).copy_from(&self.lower);
        let mut upper = DVector::zeros(n + 1);
        upper.rows_mut(0, n).copy_from(&self.upper);
        upper[n] = FLOOR_SLACK_UB;

        let mut objective = DVector::zeros(n + 1);
        objective.rows_mut(0, self.n_rxns).copy_from(&self.objective);

        Lp {
            a,
            b,
            lower,
            upper,
            objective,
            var_of_rxn: self.var_of_rxn.clone(),
            n_rxns: self.n_rxns,
        }
    }

    /// A cost vector that maximizes (`+1`) or minimizes (`-1`) one variable.
    pub fn single_var_cost(&self, var: usize, sign: f64) -> DVector<f64> {
        let mut c = DVector::zeros(self.a.ncols());
        c[var] = sign;
        c
    }

    /// The model objective padded to the current variable count.
    pub fn objective_cost(&self) -> DVector<f64> {
        let mut c = DVector::zeros(self.a.ncols());
        c.rows_mut(0, self.objective.len()).copy_from(&self.objective);
        c
    }
}
