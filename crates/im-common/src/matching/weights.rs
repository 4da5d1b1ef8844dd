use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default blend (4-factor): structured skills dominate, free-text
/// overlap and declared preferences refine, location breaks near-ties.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    skills: 0.55,
    text: 0.20,
    preference: 0.15,
    location: 0.10,
    qualification: 0.0,
};

/// Text-heavy blend (3-factor) for scoped runs where structured skill
/// tables are absent: free-text overlap carries the score, with
/// location and normalized qualification as the remaining signals.
pub const TEXT_HEAVY_WEIGHTS: Weights = Weights {
    skills: 0.0,
    text: 0.65,
    preference: 0.0,
    location: 0.20,
    qualification: 0.15,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skills: f64,
    pub text: f64,
    pub preference: f64,
    pub location: f64,
    pub qualification: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight `{name}` is negative: {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("weights sum to {sum:.6}, expected 1.0")]
    BadSum { sum: f64 },
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills + self.text + self.preference + self.location + self.qualification
    }

    /// Reject weight sets that could push the final score outside
    /// [0, 1]: any negative component, or a sum away from 1.0.
    pub fn validate(&self) -> Result<(), WeightsError> {
        let named = [
            ("skills", self.skills),
            ("text", self.text),
            ("preference", self.preference),
            ("location", self.location),
            ("qualification", self.qualification),
        ];
        for (name, value) in named {
            if value < 0.0 {
                return Err(WeightsError::Negative { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(WeightsError::BadSum { sum });
        }

        Ok(())
    }
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}
