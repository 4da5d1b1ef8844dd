//! Frozen prior placements: candidates already placed by successful
//! runs and the capacity they consumed.
//!
//! Computed once at run start as a pure value, never mutated mid-run.
//! Incremental mode subtracts this state from the input sets; optimal
//! mode receives an empty state unless the caller opts in.

use std::collections::{HashMap, HashSet};

use crate::Position;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrozenState {
    placed_candidates: HashSet<i64>,
    consumed_capacity: HashMap<i64, u32>,
}

impl FrozenState {
    /// Build from committed (candidate_id, position_id) pairs of prior
    /// successful runs.
    pub fn from_committed_pairs(pairs: &[(i64, i64)]) -> Self {
        let mut placed_candidates = HashSet::new();
        let mut consumed_capacity: HashMap<i64, u32> = HashMap::new();

        for &(candidate_id, position_id) in pairs {
            placed_candidates.insert(candidate_id);
            *consumed_capacity.entry(position_id).or_default() += 1;
        }

        Self {
            placed_candidates,
            consumed_capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placed_candidates.is_empty() && self.consumed_capacity.is_empty()
    }

    pub fn placed_count(&self) -> usize {
        self.placed_candidates.len()
    }

    /// Whether this candidate is frozen (already placed; excluded from
    /// the pool rather than rescored).
    pub fn is_placed(&self, candidate_id: i64) -> bool {
        self.placed_candidates.contains(&candidate_id)
    }

    pub fn consumed(&self, position_id: i64) -> u32 {
        self.consumed_capacity.get(&position_id).copied().unwrap_or(0)
    }

    /// Declared capacity minus consumed units, floored at zero.
    pub fn remaining_capacity(&self, position: &Position) -> u32 {
        position.capacity.saturating_sub(self.consumed(position.id))
    }
}
