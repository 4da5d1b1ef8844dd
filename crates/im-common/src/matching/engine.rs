//! Pure batch allocation: gate, score, expand, solve.
//!
//! No I/O happens here; the ledger feeds snapshots in and persists the
//! result. Failures are values, so a caller can record them on the run
//! without partial state ever becoming visible.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::capacity::expand_slots;
use super::eligibility::eligible;
use super::freeze::FrozenState;
use super::scoring::{PairScore, ScoringConfig, ScoringEngine};
use super::solver::{
    AssignmentStrategy, GreedyStrategy, OptimalStrategy, ScoredPool, SolverMode,
};
use super::weights::WeightsError;
use crate::{Candidate, Position};

#[derive(Debug, Clone)]
pub struct RunParams {
    pub mode: SolverMode,
    pub scoring: ScoringConfig,
    /// Restrict consideration to these candidate ids. `None` means the
    /// whole snapshot.
    pub scope: Option<HashSet<i64>>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            mode: SolverMode::Greedy,
            scoring: ScoringConfig::default(),
            scope: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunMetrics {
    pub assigned: usize,
    /// Candidates considered after scope and freezing exclusions.
    pub total_candidates: usize,
    /// Unit slots available after freezing.
    pub total_slots: usize,
    pub fill_rate: f64,
    pub coverage: f64,
}

impl RunMetrics {
    fn compute(assigned: usize, total_candidates: usize, total_slots: usize) -> Self {
        let ratio = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                num as f64 / den as f64
            }
        };
        Self {
            assigned,
            total_candidates,
            total_slots,
            fill_rate: ratio(assigned, total_slots),
            coverage: ratio(assigned, total_candidates),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineMatch {
    pub candidate_id: i64,
    pub position_id: i64,
    pub slot_index: u32,
    pub score: PairScore,
    pub explanation: String,
}

/// Result of a completed (non-failed) run. A run with zero matches and
/// a note is a valid outcome, not an error.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub matches: Vec<EngineMatch>,
    pub metrics: RunMetrics,
    pub note: Option<String>,
}

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("candidate snapshot is empty")]
    NoCandidates,
    #[error("position snapshot is empty")]
    NoPositions,
    #[error("positions declare no capacity")]
    NoDeclaredCapacity,
    #[error("invalid scoring weights: {0}")]
    InvalidWeights(#[from] WeightsError),
}

pub struct AllocationEngine {
    params: RunParams,
    scoring: ScoringEngine,
}

impl AllocationEngine {
    pub fn new(params: RunParams) -> Result<Self, AllocationError> {
        params.scoring.weights.validate()?;
        let scoring = ScoringEngine::new(params.scoring.clone());
        Ok(Self { params, scoring })
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Execute one allocation over a point-in-time snapshot.
    ///
    /// `frozen` carries prior committed placements; pass
    /// `FrozenState::default()` to recompute from scratch.
    pub fn run(
        &self,
        candidates: &[Candidate],
        positions: &[Position],
        frozen: &FrozenState,
    ) -> Result<Allocation, AllocationError> {
        if candidates.is_empty() {
            return Err(AllocationError::NoCandidates);
        }
        if positions.is_empty() {
            return Err(AllocationError::NoPositions);
        }
        if positions.iter().all(|p| p.capacity == 0) {
            return Err(AllocationError::NoDeclaredCapacity);
        }

        // Frozen candidates are excluded outright, not rescored; a
        // supplied scope then intersects what remains.
        let pool: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| !frozen.is_placed(c.id))
            .filter(|c| {
                self.params
                    .scope
                    .as_ref()
                    .map_or(true, |scope| scope.contains(&c.id))
            })
            .collect();

        let slots = expand_slots(positions, frozen);

        if pool.is_empty() {
            let note = if self.params.scope.is_some() {
                "scope resolved to no candidates after exclusions"
            } else {
                "all candidates already placed by prior runs"
            };
            return Ok(Allocation {
                matches: Vec::new(),
                metrics: RunMetrics::compute(0, 0, slots.len()),
                note: Some(note.into()),
            });
        }

        if slots.is_empty() {
            return Ok(Allocation {
                matches: Vec::new(),
                metrics: RunMetrics::compute(0, pool.len(), 0),
                note: Some("no remaining capacity".into()),
            });
        }

        let open_positions: Vec<&Position> = positions
            .iter()
            .filter(|p| frozen.remaining_capacity(p) > 0)
            .collect();
        let position_ids: Vec<i64> = open_positions.iter().map(|p| p.id).collect();

        let scores: Vec<Vec<Option<PairScore>>> = pool
            .iter()
            .map(|candidate| {
                open_positions
                    .iter()
                    .map(|position| {
                        if !eligible(candidate, position) {
                            return None;
                        }
                        Some(self.scoring.score(candidate, position))
                    })
                    .collect()
            })
            .collect();

        let scored = ScoredPool::new(
            pool.iter().map(|c| c.id).collect(),
            &position_ids,
            slots,
            scores,
        );

        let strategy: &dyn AssignmentStrategy = match self.params.mode {
            SolverMode::Optimal => &OptimalStrategy,
            SolverMode::Greedy => &GreedyStrategy,
        };
        debug!(
            strategy = strategy.name(),
            candidates = scored.n_candidates(),
            slots = scored.n_slots(),
            "solving assignment"
        );
        let assignments = strategy.assign(&scored);

        let weights = &self.params.scoring.weights;
        let mut matches: Vec<EngineMatch> = assignments
            .into_iter()
            .filter_map(|a| {
                // Strategies only emit scored cells; a missing score
                // would be a solver bug, so the cell is dropped rather
                // than surfaced as a bogus match.
                let score = *scored.score(a.candidate, a.slot)?;
                let slot = scored.slot(a.slot);
                Some(EngineMatch {
                    candidate_id: scored.candidate_id(a.candidate),
                    position_id: slot.position_id,
                    slot_index: slot.slot_index,
                    score,
                    explanation: score.explanation(weights),
                })
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .total
                .total_cmp(&a.score.total)
                .then(a.candidate_id.cmp(&b.candidate_id))
        });

        let metrics =
            RunMetrics::compute(matches.len(), scored.n_candidates(), scored.n_slots());

        Ok(Allocation {
            matches,
            metrics,
            note: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::weights::TEXT_HEAVY_WEIGHTS;

    fn candidate(id: i64, qualification: Option<f64>, skills: &[(&str, f64)]) -> Candidate {
        Candidate {
            id,
            qualification,
            skills: skills
                .iter()
                .map(|(code, p)| (code.to_string(), *p))
                .collect(),
            ..Candidate::default()
        }
    }

    fn position(id: i64, capacity: u32, min_qualification: f64, skills: &[(&str, f64)]) -> Position {
        Position {
            id,
            capacity,
            min_qualification,
            required_skills: skills
                .iter()
                .map(|(code, w)| (code.to_string(), *w))
                .collect(),
            ..Position::default()
        }
    }

    fn engine(mode: SolverMode) -> AllocationEngine {
        AllocationEngine::new(RunParams {
            mode,
            ..RunParams::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_invalid_weights() {
        let mut params = RunParams::default();
        params.scoring.weights.skills = 0.9;
        assert!(matches!(
            AllocationEngine::new(params),
            Err(AllocationError::InvalidWeights(_))
        ));
    }

    #[test]
    fn empty_candidate_snapshot_fails() {
        let positions = [position(10, 1, 0.0, &[("python", 1.0)])];
        let err = engine(SolverMode::Greedy)
            .run(&[], &positions, &FrozenState::default())
            .unwrap_err();
        assert!(matches!(err, AllocationError::NoCandidates));
    }

    #[test]
    fn empty_position_snapshot_fails() {
        let candidates = [candidate(1, Some(8.0), &[("python", 1.0)])];
        let err = engine(SolverMode::Greedy)
            .run(&candidates, &[], &FrozenState::default())
            .unwrap_err();
        assert!(matches!(err, AllocationError::NoPositions));
    }

    #[test]
    fn zero_declared_capacity_fails() {
        let candidates = [candidate(1, Some(8.0), &[("python", 1.0)])];
        let positions = [position(10, 0, 0.0, &[("python", 1.0)])];
        let err = engine(SolverMode::Greedy)
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap_err();
        assert!(matches!(err, AllocationError::NoDeclaredCapacity));
    }

    #[test]
    fn below_gate_candidate_never_matches() {
        // Qualification 5.0 against a 6.0 gate: excluded in both modes
        // regardless of a perfect skill match.
        let candidates = [candidate(1, Some(5.0), &[("python", 1.0)])];
        let positions = [position(10, 1, 6.0, &[("python", 1.0)])];

        for mode in [SolverMode::Greedy, SolverMode::Optimal] {
            let allocation = engine(mode)
                .run(&candidates, &positions, &FrozenState::default())
                .unwrap();
            assert!(allocation.matches.is_empty());
        }
    }

    #[test]
    fn higher_score_wins_single_slot() {
        // X covers the requirement fully, Y partially; one slot.
        let candidates = [
            candidate(1, Some(8.0), &[("python", 1.0)]),
            candidate(2, Some(8.0), &[("python", 0.6)]),
        ];
        let positions = [position(10, 1, 6.0, &[("python", 1.0)])];

        let allocation = engine(SolverMode::Greedy)
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();

        assert_eq!(allocation.matches.len(), 1);
        let matched = &allocation.matches[0];
        assert_eq!(matched.candidate_id, 1);
        assert_eq!(matched.position_id, 10);
        assert_eq!(matched.slot_index, 1);
        assert_eq!(allocation.metrics.assigned, 1);
        assert!((allocation.metrics.fill_rate - 1.0).abs() < 1e-12);
        assert!((allocation.metrics.coverage - 0.5).abs() < 1e-12);
    }

    #[test]
    fn full_skill_match_scores_scenario_weight() {
        let candidates = [candidate(1, Some(8.0), &[("python", 1.0)])];
        let positions = [position(10, 1, 6.0, &[("python", 1.0)])];

        let allocation = engine(SolverMode::Greedy)
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();

        let matched = &allocation.matches[0];
        assert_eq!(matched.score.components.skills, 1.0);
        // Default blend: skills contribute 0.55.
        assert!(matched.score.total >= 0.55);
        assert!(matched.explanation.contains("skills 1.00*0.55"));
    }

    #[test]
    fn optimal_mode_beats_greedy_total() {
        // A: 1.0 on p10's skill, 0.8 on p11's. B: 0.9 on p10's, 0.0
        // on p11's. Greedy gives A p10 and B nothing; optimal swaps.
        let candidates = [
            candidate(1, None, &[("python", 1.0), ("sql", 0.8)]),
            candidate(2, None, &[("python", 0.9)]),
        ];
        let positions = [
            position(10, 1, 0.0, &[("python", 1.0)]),
            position(11, 1, 0.0, &[("sql", 1.0)]),
        ];

        let greedy = engine(SolverMode::Greedy)
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();
        let optimal = engine(SolverMode::Optimal)
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();

        let total = |a: &Allocation| a.matches.iter().map(|m| m.score.total).sum::<f64>();
        assert_eq!(greedy.metrics.assigned, 1);
        assert_eq!(optimal.metrics.assigned, 2);
        assert!(total(&optimal) > total(&greedy));
    }

    #[test]
    fn each_candidate_and_slot_appears_at_most_once() {
        let candidates: Vec<Candidate> = (1..=5)
            .map(|id| candidate(id, None, &[("python", 0.2 * id as f64)]))
            .collect();
        let positions = [
            position(10, 2, 0.0, &[("python", 1.0)]),
            position(11, 1, 0.0, &[("python", 1.0)]),
        ];

        for mode in [SolverMode::Greedy, SolverMode::Optimal] {
            let allocation = engine(mode)
                .run(&candidates, &positions, &FrozenState::default())
                .unwrap();

            let mut seen_candidates = std::collections::HashSet::new();
            let mut seen_slots = std::collections::HashSet::new();
            for m in &allocation.matches {
                assert!(seen_candidates.insert(m.candidate_id));
                assert!(seen_slots.insert((m.position_id, m.slot_index)));
            }
            assert_eq!(allocation.matches.len(), 3);
        }
    }

    #[test]
    fn frozen_rerun_produces_zero_new_matches() {
        let candidates = [
            candidate(1, None, &[("python", 1.0)]),
            candidate(2, None, &[("python", 0.8)]),
        ];
        let positions = [position(10, 2, 0.0, &[("python", 1.0)])];
        let eng = engine(SolverMode::Greedy);

        let first = eng
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();
        assert_eq!(first.matches.len(), 2);

        let committed: Vec<(i64, i64)> = first
            .matches
            .iter()
            .map(|m| (m.candidate_id, m.position_id))
            .collect();
        let frozen = FrozenState::from_committed_pairs(&committed);

        let second = eng.run(&candidates, &positions, &frozen).unwrap();
        assert!(second.matches.is_empty());
        assert!(second.note.is_some());
    }

    #[test]
    fn scope_restricts_the_pool() {
        let candidates = [
            candidate(1, None, &[("python", 1.0)]),
            candidate(2, None, &[("python", 0.9)]),
        ];
        let positions = [position(10, 2, 0.0, &[("python", 1.0)])];

        let eng = AllocationEngine::new(RunParams {
            mode: SolverMode::Greedy,
            scope: Some([2i64].into_iter().collect()),
            ..RunParams::default()
        })
        .unwrap();

        let allocation = eng
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();
        assert_eq!(allocation.matches.len(), 1);
        assert_eq!(allocation.matches[0].candidate_id, 2);
    }

    #[test]
    fn empty_scope_after_exclusions_succeeds_with_note() {
        let candidates = [candidate(1, None, &[("python", 1.0)])];
        let positions = [position(10, 1, 0.0, &[("python", 1.0)])];

        let eng = AllocationEngine::new(RunParams {
            mode: SolverMode::Greedy,
            scope: Some([99i64].into_iter().collect()),
            ..RunParams::default()
        })
        .unwrap();

        let allocation = eng
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();
        assert!(allocation.matches.is_empty());
        assert_eq!(
            allocation.note.as_deref(),
            Some("scope resolved to no candidates after exclusions")
        );
    }

    #[test]
    fn exhausted_capacity_succeeds_with_note() {
        let candidates = [
            candidate(1, None, &[("python", 1.0)]),
            candidate(2, None, &[("python", 1.0)]),
        ];
        let positions = [position(10, 1, 0.0, &[("python", 1.0)])];
        // Slot already consumed by a prior run's placement of some
        // other candidate.
        let frozen = FrozenState::from_committed_pairs(&[(99, 10)]);

        let allocation = engine(SolverMode::Greedy)
            .run(&candidates, &positions, &frozen)
            .unwrap();
        assert!(allocation.matches.is_empty());
        assert_eq!(allocation.note.as_deref(), Some("no remaining capacity"));
    }

    #[test]
    fn text_heavy_blend_scores_without_structured_skills() {
        let mut params = RunParams::default();
        params.scoring.weights = TEXT_HEAVY_WEIGHTS;
        let eng = AllocationEngine::new(params).unwrap();

        let candidates = [Candidate {
            id: 1,
            qualification: Some(8.0),
            skills_text: "python data analysis".into(),
            ..Candidate::default()
        }];
        let positions = [Position {
            id: 10,
            capacity: 1,
            min_qualification: 6.0,
            requirements_text: "python data pipelines".into(),
            ..Position::default()
        }];

        let allocation = eng
            .run(&candidates, &positions, &FrozenState::default())
            .unwrap();
        assert_eq!(allocation.matches.len(), 1);
        let score = &allocation.matches[0].score;
        assert!(score.components.text > 0.0);
        assert!(score.components.qualification > 0.0);
        assert_eq!(score.components.skills, 0.0);
    }

    #[test]
    fn metrics_use_post_exclusion_denominators() {
        let candidates = [
            candidate(1, None, &[("python", 1.0)]),
            candidate(2, None, &[("python", 1.0)]),
            candidate(3, None, &[("python", 1.0)]),
        ];
        let positions = [position(10, 2, 0.0, &[("python", 1.0)])];
        let frozen = FrozenState::from_committed_pairs(&[(3, 10)]);

        let allocation = engine(SolverMode::Greedy)
            .run(&candidates, &positions, &frozen)
            .unwrap();

        // Candidate 3 frozen out, one of two slots consumed.
        assert_eq!(allocation.metrics.total_candidates, 2);
        assert_eq!(allocation.metrics.total_slots, 1);
        assert_eq!(allocation.metrics.assigned, 1);
    }
}
