//! Assignment strategies over the scored candidate x slot pool.
//!
//! Both strategies share the same eligibility/scoring/expansion
//! pipeline; only the assignment step differs.

pub mod greedy;
pub mod hungarian;
pub mod optimal;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::capacity::Slot;
use super::scoring::PairScore;

pub use greedy::GreedyStrategy;
pub use optimal::OptimalStrategy;

/// Strategy selection carried in run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    /// Global minimum-cost one-to-one assignment.
    Optimal,
    /// Score-sorted single-pass first-fit; pairs well with freezing.
    Greedy,
}

impl SolverMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverMode::Optimal => "optimal",
            SolverMode::Greedy => "greedy",
        }
    }
}

/// Scored candidate x slot pool. Scores are stored once per
/// (candidate, position); slots of the same position share the entry
/// since unit slots are interchangeable.
#[derive(Debug, Clone)]
pub struct ScoredPool {
    candidate_ids: Vec<i64>,
    slots: Vec<Slot>,
    /// slot index -> index into the position axis of `scores`.
    slot_position: Vec<usize>,
    /// `scores[candidate][position]`; `None` marks an ineligible pair.
    scores: Vec<Vec<Option<PairScore>>>,
}

impl ScoredPool {
    /// `scores` is indexed `[candidate][position]` with positions in
    /// the order of `position_ids`. Panics in debug builds on shape
    /// mismatch; the engine is the only constructor call site.
    pub fn new(
        candidate_ids: Vec<i64>,
        position_ids: &[i64],
        slots: Vec<Slot>,
        scores: Vec<Vec<Option<PairScore>>>,
    ) -> Self {
        debug_assert_eq!(candidate_ids.len(), scores.len());

        let index_of: HashMap<i64, usize> = position_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();
        let slot_position = slots
            .iter()
            .map(|slot| index_of[&slot.position_id])
            .collect();

        Self {
            candidate_ids,
            slots,
            slot_position,
            scores,
        }
    }

    pub fn n_candidates(&self) -> usize {
        self.candidate_ids.len()
    }

    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn candidate_id(&self, candidate: usize) -> i64 {
        self.candidate_ids[candidate]
    }

    pub fn slot(&self, slot: usize) -> Slot {
        self.slots[slot]
    }

    /// Score for a (candidate, slot) cell; `None` for ineligible pairs.
    pub fn score(&self, candidate: usize, slot: usize) -> Option<&PairScore> {
        self.scores[candidate][self.slot_position[slot]].as_ref()
    }
}

/// One chosen (candidate, slot) cell, by pool indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub candidate: usize,
    pub slot: usize,
}

/// Capability seam between the shared pipeline and the two solver
/// implementations. Implementations must only return cells whose
/// resolved score is strictly positive.
pub trait AssignmentStrategy {
    fn name(&self) -> &'static str;
    fn assign(&self, pool: &ScoredPool) -> Vec<Assignment>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(SolverMode::Optimal).unwrap(),
            serde_json::json!("optimal")
        );
        assert_eq!(SolverMode::Greedy.as_str(), "greedy");
    }

    #[test]
    fn pool_maps_slots_back_to_position_scores() {
        let score = PairScore {
            total: 0.5,
            components: Default::default(),
        };
        let pool = ScoredPool::new(
            vec![7],
            &[10, 11],
            vec![
                Slot { position_id: 10, slot_index: 1 },
                Slot { position_id: 10, slot_index: 2 },
                Slot { position_id: 11, slot_index: 1 },
            ],
            vec![vec![Some(score), None]],
        );

        assert_eq!(pool.n_candidates(), 1);
        assert_eq!(pool.n_slots(), 3);
        assert_eq!(pool.candidate_id(0), 7);
        // Both slots of position 10 share the same score entry.
        assert_eq!(pool.score(0, 0).unwrap().total, 0.5);
        assert_eq!(pool.score(0, 1).unwrap().total, 0.5);
        assert!(pool.score(0, 2).is_none());
    }
}
