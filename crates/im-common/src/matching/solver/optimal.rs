//! Optimal mode: global minimum-cost one-to-one assignment over
//! cost = 1 - score.

use super::hungarian;
use super::{Assignment, AssignmentStrategy, ScoredPool};

/// Cost assigned to ineligible or non-positive-score cells. Any
/// eligible pair has cost strictly below this, so a sentinel match can
/// always be recognized and discarded after solving.
pub const SENTINEL_COST: f64 = 1.0;

pub struct OptimalStrategy;

impl AssignmentStrategy for OptimalStrategy {
    fn name(&self) -> &'static str {
        "optimal"
    }

    /// Builds the candidate x slot cost matrix and solves it exactly.
    /// The solver may be forced onto sentinel cells when eligible
    /// cells run out; those matches are discarded post hoc rather than
    /// surfaced as assignments.
    fn assign(&self, pool: &ScoredPool) -> Vec<Assignment> {
        let n = pool.n_candidates();
        let m = pool.n_slots();
        if n == 0 || m == 0 {
            return Vec::new();
        }

        let costs: Vec<Vec<f64>> = (0..n)
            .map(|candidate| {
                (0..m)
                    .map(|slot| match pool.score(candidate, slot) {
                        Some(score) if score.total > 0.0 => {
                            (1.0 - score.total).clamp(0.0, SENTINEL_COST)
                        }
                        _ => SENTINEL_COST,
                    })
                    .collect()
            })
            .collect();

        hungarian::solve(&costs)
            .into_iter()
            .enumerate()
            .filter_map(|(candidate, slot)| slot.map(|slot| Assignment { candidate, slot }))
            .filter(|a| costs[a.candidate][a.slot] < SENTINEL_COST)
            .collect()
    }
}
