//! Mutable constraint model with strict bound setters.

use crate::reaction::Reaction;
use crate::{ModelError, ModelResult};
use fr_core::RxnId;
use std::collections::HashMap;

/// In-memory network of named reactions.
///
/// Reactions keep their load order; lookups go through a side index. The
/// model is deliberately not `Clone`-shared across tasks: batch work loads a
/// fresh instance per condition instead.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    id: Option<String>,
    reactions: Vec<Reaction>,
    index: HashMap<String, RxnId>,
}

impl ConstraintModel {
    /// Build a model from reactions, rejecting duplicate ids and `lb > ub`.
    pub fn from_reactions(
        id: Option<String>,
        reactions: Vec<Reaction>,
    ) -> ModelResult<Self> {
        let mut index = HashMap::with_capacity(reactions.len());
        for (i, rxn) in reactions.iter().enumerate() {
            if !rxn.lower_bound.is_finite() || !rxn.upper_bound.is_finite() {
                let bad = if rxn.lower_bound.is_finite() {
                    rxn.upper_bound
                } else {
                    rxn.lower_bound
                };
                return Err(ModelError::NonFiniteBound {
                    id: rxn.id.clone(),
                    value: bad,
                });
            }
            if rxn.lower_bound > rxn.upper_bound {
                return Err(ModelError::InvalidBounds {
                    id: rxn.id.clone(),
                    lb: rxn.lower_bound,
                    ub: rxn.upper_bound,
                });
            }
            if index
                .insert(rxn.id.clone(), RxnId::from_index(i as u32))
                .is_some()
            {
                return Err(ModelError::DuplicateReaction { id: rxn.id.clone() });
            }
        }
        Ok(Self {
            id,
            reactions,
            index,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }

    pub fn contains(&self, rxn_id: &str) -> bool {
        self.index.contains_key(rxn_id)
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn reaction(&self, rxn_id: &str) -> Option<&Reaction> {
        self.index
            .get(rxn_id)
            .map(|id| &self.reactions[id.index() as usize])
    }

    fn require_idx(&self, rxn_id: &str) -> ModelResult<usize> {
        self.index
            .get(rxn_id)
            .map(|id| id.index() as usize)
            .ok_or_else(|| ModelError::UnknownReaction {
                id: rxn_id.to_string(),
            })
    }

    /// Current `(lower_bound, upper_bound)` for a reaction.
    pub fn bounds(&self, rxn_id: &str) -> ModelResult<(f64, f64)> {
        let i = self.require_idx(rxn_id)?;
        let r = &self.reactions[i];
        Ok((r.lower_bound, r.upper_bound))
    }

    /// Set the lower bound, rejecting any value that would cross the upper
    /// bound. This is what makes transient `lb > ub` states observable: a
    /// caller that orders its mutations wrongly gets an error, not silent
    /// corruption.
    pub fn set_lower_bound(&mut self, rxn_id: &str, value: f64) -> ModelResult<()> {
        if !value.is_finite() {
            return Err(ModelError::NonFiniteBound {
                id: rxn_id.to_string(),
                value,
            });
        }
        let i = self.require_idx(rxn_id)?;
        let ub = self.reactions[i].upper_bound;
        if value > ub {
            return Err(ModelError::InvalidBounds {
                id: rxn_id.to_string(),
                lb: value,
                ub,
            });
        }
        self.reactions[i].lower_bound = value;
        Ok(())
    }

    /// Set the upper bound, rejecting any value that would cross the lower
    /// bound.
    pub fn set_upper_bound(&mut self, rxn_id: &str, value: f64) -> ModelResult<()> {
        if !value.is_finite() {
            return Err(ModelError::NonFiniteBound {
                id: rxn_id.to_string(),
                value,
            });
        }
        let i = self.require_idx(rxn_id)?;
        let lb = self.reactions[i].lower_bound;
        if value < lb {
            return Err(ModelError::InvalidBounds {
                id: rxn_id.to_string(),
                lb,
                ub: value,
            });
        }
        self.reactions[i].upper_bound = value;
        Ok(())
    }

    /// Set both bounds, ordering the two strict mutations so that no
    /// intermediate state violates `lb <= ub`.
    ///
    /// When the new upper bound does not undercut the current lower bound the
    /// upper bound goes first (the widening-from-negative case); otherwise
    /// both new bounds sit below the current lower bound and the lower bound
    /// must move first.
    pub fn set_bounds(&mut self, rxn_id: &str, lb: f64, ub: f64) -> ModelResult<()> {
        if lb > ub {
            return Err(ModelError::InvalidBounds {
                id: rxn_id.to_string(),
                lb,
                ub,
            });
        }
        let (cur_lb, _) = self.bounds(rxn_id)?;
        if ub >= cur_lb {
            self.set_upper_bound(rxn_id, ub)?;
            self.set_lower_bound(rxn_id, lb)?;
        } else {
            self.set_lower_bound(rxn_id, lb)?;
            self.set_upper_bound(rxn_id, ub)?;
        }
        Ok(())
    }

    /// First candidate reaction id that exists in the model, in candidate
    /// order.
    pub fn first_existing_id<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .iter()
            .map(String::as_str)
            .find(|rid| self.contains(rid))
    }

    /// Reaction ids with a nonzero objective coefficient.
    pub fn objective_ids(&self) -> impl Iterator<Item = &str> {
        self.reactions
            .iter()
            .filter(|r| r.objective_coefficient != 0.0)
            .map(|r| r.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rxn_model() -> ConstraintModel {
        ConstraintModel::from_reactions(
            None,
            vec![
                Reaction::new("EX_ac_e", -10.0, 1000.0),
                Reaction::new("GROWTH", 0.0, 1000.0).with_objective(1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_reaction_rejected() {
        let err = ConstraintModel::from_reactions(
            None,
            vec![
                Reaction::new("EX_ac_e", -10.0, 10.0),
                Reaction::new("EX_ac_e", -5.0, 5.0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateReaction { .. }));
    }

    #[test]
    fn strict_setter_rejects_crossing() {
        let mut m = two_rxn_model();
        let err = m.set_lower_bound("GROWTH", 2000.0).unwrap_err();
        assert!(matches!(err, ModelError::InvalidBounds { .. }));
        // model unchanged after the rejected mutation
        assert_eq!(m.bounds("GROWTH").unwrap(), (0.0, 1000.0));
    }

    #[test]
    fn set_bounds_orders_widening_from_negative_ub() {
        let mut m = ConstraintModel::from_reactions(
            None,
            vec![Reaction::new("EX_ac_e", -10.0, -0.2)],
        )
        .unwrap();
        // ub must move to 0.0 before lb rises to -0.5; the strict setters
        // would reject the reverse order.
        m.set_bounds("EX_ac_e", -0.5, 0.0).unwrap();
        assert_eq!(m.bounds("EX_ac_e").unwrap(), (-0.5, 0.0));
    }

    #[test]
    fn set_bounds_orders_drop_below_current_lb() {
        let mut m = ConstraintModel::from_reactions(
            None,
            vec![Reaction::new("V", 5.0, 10.0)],
        )
        .unwrap();
        m.set_bounds("V", -3.0, -1.0).unwrap();
        assert_eq!(m.bounds("V").unwrap(), (-3.0, -1.0));
    }

    #[test]
    fn first_existing_prefers_candidate_order() {
        let m = two_rxn_model();
        let cands = vec!["EX_o2_e".to_string(), "GROWTH".to_string(), "EX_ac_e".to_string()];
        assert_eq!(m.first_existing_id(&cands), Some("GROWTH"));
    }
}
