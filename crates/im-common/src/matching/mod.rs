pub mod capacity;
pub mod eligibility;
pub mod engine;
pub mod freeze;
pub mod scoring;
pub mod solver;
pub mod text;
pub mod weights;

pub use capacity::{expand_slots, Slot};
pub use eligibility::eligible;
pub use engine::{
    Allocation, AllocationEngine, AllocationError, EngineMatch, RunMetrics, RunParams,
};
pub use freeze::FrozenState;
pub use scoring::{PairScore, ScoreComponents, ScoringConfig, ScoringEngine};
pub use solver::{AssignmentStrategy, ScoredPool, SolverMode};
pub use weights::{Weights, WeightsError, DEFAULT_WEIGHTS, TEXT_HEAVY_WEIGHTS};
