//! Conflict-resolution policies.
//!
//! When several bindings are feasible at the same clock reading the
//! engine asks its [`ConflictPolicy`] to pick exactly one. The policy
//! receives a non-empty slice and the engine's RNG, and returns the
//! index of its choice; the engine treats an out-of-range index as a
//! fatal contract violation and never calls a policy with an empty
//! slice.

use rand::{Rng, RngCore};

use crate::binding::Binding;

/// Picks one binding to fire out of the feasible set.
pub trait ConflictPolicy: Send {
    /// Choose the index of the binding to fire.
    ///
    /// `offers` is never empty; the engine guarantees it.
    fn choose(&mut self, offers: &[Binding], rng: &mut dyn RngCore) -> usize;
}

/// Uniform random choice among all feasible bindings (the default).
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPolicy;

impl ConflictPolicy for UniformPolicy {
    fn choose(&mut self, offers: &[Binding], rng: &mut dyn RngCore) -> usize {
        rng.random_range(0..offers.len())
    }
}

/// Priority-class scheduler keyed on a named milestone counter.
///
/// Each binding scores the sum of its selected tokens'
/// [milestone counts] for the configured target name. Bindings are
/// ranked by descending score; when the top score is zero every
/// binding is eligible, otherwise only the bindings sharing the top
/// score. The final choice is uniform among the eligible class, so
/// high-priority lineages keep moving without starving equal-priority
/// competitors.
///
/// [milestone counts]: tokenflow_types::Value::milestone_count
#[derive(Debug, Clone)]
pub struct MilestonePolicy {
    target: String,
}

impl MilestonePolicy {
    /// Rank bindings by counters attached to `target` -- typically the
    /// name of the source that mints case tokens.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The configured milestone name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Total milestone count across a binding's selected tokens.
    fn score(&self, binding: &Binding) -> i64 {
        binding
            .selection
            .iter()
            .map(|(_, token)| token.value.milestone_count(&self.target))
            .fold(0_i64, i64::saturating_add)
    }
}

impl ConflictPolicy for MilestonePolicy {
    fn choose(&mut self, offers: &[Binding], rng: &mut dyn RngCore) -> usize {
        if offers.len() < 2 {
            return 0;
        }

        let scores: Vec<i64> = offers.iter().map(|offer| self.score(offer)).collect();
        let top = scores.iter().copied().max().unwrap_or(0);

        let eligible: Vec<usize> = if top == 0 {
            (0..offers.len()).collect()
        } else {
            scores
                .iter()
                .enumerate()
                .filter(|(_, score)| **score == top)
                .map(|(index, _)| index)
                .collect()
        };

        let pick = rng.random_range(0..eligible.len());
        eligible.get(pick).copied().unwrap_or(0)
    }
}
