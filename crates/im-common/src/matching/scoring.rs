use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::text::jaccard;
use super::weights::Weights;
use crate::normalize::{normalize_location, pincode_prefix};
use crate::{Candidate, Position};

/// Scoring configuration for one run. Weights must validate before an
/// engine is built; the remaining knobs have documented defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub weights: Weights,
    /// Postal-code prefix length treated as "same area" when location
    /// codes differ.
    pub pincode_prefix_len: usize,
    /// Band used to normalize qualification into [0, 1] for the
    /// text-heavy blend.
    pub qualification_band: (f64, f64),
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            pincode_prefix_len: 3,
            qualification_band: (6.0, 9.5),
        }
    }
}

/// Per-signal values, each independently bounded to [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub skills: f64,
    pub text: f64,
    pub preference: f64,
    pub location: f64,
    pub qualification: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    /// Weighted combination of the components, clamped to [0, 1].
    pub total: f64,
    pub components: ScoreComponents,
}

impl PairScore {
    /// JSON breakdown persisted alongside each match, components plus
    /// the weights that produced the total.
    pub fn breakdown(&self, weights: &Weights) -> Value {
        serde_json::json!({
            "components": self.components,
            "weights": weights,
        })
    }

    /// One-line human-readable decomposition of the total.
    pub fn explanation(&self, weights: &Weights) -> String {
        let c = &self.components;
        format!(
            "skills {:.2}*{:.2} + text {:.2}*{:.2} + pref {:.2}*{:.2} + loc {:.2}*{:.2} + qual {:.2}*{:.2} = {:.4}",
            c.skills,
            weights.skills,
            c.text,
            weights.text,
            c.preference,
            weights.preference,
            c.location,
            weights.location,
            c.qualification,
            weights.qualification,
            self.total,
        )
    }
}

pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compute the bounded compatibility score for one pair. Pure:
    /// identical inputs yield bit-identical components and total.
    pub fn score(&self, candidate: &Candidate, position: &Position) -> PairScore {
        let components = ScoreComponents {
            skills: structured_skill_overlap(candidate, position),
            text: jaccard(&candidate.skills_text, &position.requirements_text),
            preference: preference_bonus(candidate, position),
            location: self.location_proximity(candidate, position),
            qualification: self.qualification_norm(candidate, position),
        };

        let w = &self.config.weights;
        let total = (components.skills * w.skills
            + components.text * w.text
            + components.preference * w.preference
            + components.location * w.location
            + components.qualification * w.qualification)
            .clamp(0.0, 1.0);

        PairScore { total, components }
    }

    /// Binary proximity: 1.0 when normalized location codes match, or
    /// when both pincodes share the configured prefix; else 0.0.
    fn location_proximity(&self, candidate: &Candidate, position: &Position) -> f64 {
        let candidate_loc = candidate.location_code.as_deref().and_then(normalize_location);
        let position_loc = position.location_code.as_deref().and_then(normalize_location);
        if let (Some(a), Some(b)) = (&candidate_loc, &position_loc) {
            if a == b {
                return 1.0;
            }
        }

        let len = self.config.pincode_prefix_len;
        let candidate_pin = candidate.pincode.as_deref().and_then(|p| pincode_prefix(p, len));
        let position_pin = position.pincode.as_deref().and_then(|p| pincode_prefix(p, len));
        match (candidate_pin, position_pin) {
            (Some(a), Some(b)) if a == b => 1.0,
            _ => 0.0,
        }
    }

    /// Qualification normalized over the configured band, used only by
    /// weight blends that carry a qualification weight. Positions
    /// without a qualification gate contribute 0, mirroring the gate
    /// semantics: no threshold, no qualification signal.
    fn qualification_norm(&self, candidate: &Candidate, position: &Position) -> f64 {
        if position.min_qualification <= 0.0 {
            return 0.0;
        }

        let (lo, hi) = self.config.qualification_band;
        if hi <= lo {
            return 0.0;
        }

        let q = candidate.qualification.unwrap_or(0.0);
        ((q - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

/// Weighted proficiency coverage of the position's structured
/// requirements: sum(weight * proficiency) / sum(weight), clamped.
/// 0.0 when the position declares no structured requirements.
pub fn structured_skill_overlap(candidate: &Candidate, position: &Position) -> f64 {
    if position.required_skills.is_empty() {
        return 0.0;
    }

    let mut total_weight = 0.0;
    let mut achieved = 0.0;
    for (code, weight) in &position.required_skills {
        total_weight += weight;
        if let Some(proficiency) = candidate.skills.get(code) {
            achieved += weight * proficiency;
        }
    }

    if total_weight <= 0.0 {
        return 0.0;
    }

    (achieved / total_weight).clamp(0.0, 1.0)
}

/// Fixed bonus table keyed by the candidate's declared rank for this
/// position. Ranks past the third and missing rankings earn nothing.
pub fn preference_bonus(candidate: &Candidate, position: &Position) -> f64 {
    match candidate.preferences.get(&position.id) {
        Some(1) => 0.20,
        Some(2) => 0.10,
        Some(3) => 0.05,
        _ => 0.0,
    }
}
