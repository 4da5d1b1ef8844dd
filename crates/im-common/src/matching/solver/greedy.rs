//! Greedy mode: score-sorted single-pass first-fit assignment.
//!
//! A maximal-weight matching approximation, O(P log P) over the P
//! positive-score cells. Chosen for speed and because it composes
//! naturally with freezing: it never needs to revisit a decision, so
//! prior placements stay untouched.

use std::cmp::Ordering;

use super::{Assignment, AssignmentStrategy, ScoredPool};

pub struct GreedyStrategy;

#[derive(Debug, Clone, Copy)]
struct RankedCell {
    candidate: usize,
    slot: usize,
    candidate_id: i64,
    position_id: i64,
    slot_index: u32,
    score: f64,
}

impl AssignmentStrategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    /// Enumerate positive-score cells, sort, and walk once. The sort
    /// key (score desc, candidate id asc, position id asc, slot index
    /// asc) is total, so results are reproducible regardless of input
    /// order.
    fn assign(&self, pool: &ScoredPool) -> Vec<Assignment> {
        let mut ranked = Vec::new();
        for candidate in 0..pool.n_candidates() {
            for slot in 0..pool.n_slots() {
                let Some(score) = pool.score(candidate, slot) else {
                    continue;
                };
                if score.total <= 0.0 {
                    continue;
                }
                let slot_info = pool.slot(slot);
                ranked.push(RankedCell {
                    candidate,
                    slot,
                    candidate_id: pool.candidate_id(candidate),
                    position_id: slot_info.position_id,
                    slot_index: slot_info.slot_index,
                    score: score.total,
                });
            }
        }

        ranked.sort_by(|a, b| match b.score.total_cmp(&a.score) {
            Ordering::Equal => a
                .candidate_id
                .cmp(&b.candidate_id)
                .then(a.position_id.cmp(&b.position_id))
                .then(a.slot_index.cmp(&b.slot_index)),
            other => other,
        });

        let mut candidate_taken = vec![false; pool.n_candidates()];
        let mut slot_taken = vec![false; pool.n_slots()];
        let mut assignments = Vec::new();

        for cell in ranked {
            if candidate_taken[cell.candidate] || slot_taken[cell.slot] {
                continue;
            }
            candidate_taken[cell.candidate] = true;
            slot_taken[cell.slot] = true;
            assignments.push(Assignment {
                candidate: cell.candidate,
                slot: cell.slot,
            });
        }

        assignments
    }
}
