//! Hard pass/fail gate evaluated before any scoring.

use crate::{Candidate, Position};

/// A pair is ineligible iff the position declares a minimum
/// qualification above zero and the candidate's qualification is
/// absent or strictly below it. A zero threshold disables the gate
/// entirely, including for candidates with no reported qualification.
///
/// Ineligible pairs must be excluded from assignment, never merely
/// scored low.
pub fn eligible(candidate: &Candidate, position: &Position) -> bool {
    if position.min_qualification <= 0.0 {
        return true;
    }

    match candidate.qualification {
        Some(q) => q >= position.min_qualification,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_with_gate(min_qualification: f64) -> Position {
        Position {
            id: 1,
            capacity: 1,
            min_qualification,
            ..Position::default()
        }
    }

    fn candidate_with(qualification: Option<f64>) -> Candidate {
        Candidate {
            id: 1,
            qualification,
            ..Candidate::default()
        }
    }

    #[test]
    fn below_threshold_fails() {
        assert!(!eligible(
            &candidate_with(Some(5.0)),
            &position_with_gate(6.0)
        ));
    }

    #[test]
    fn at_or_above_threshold_passes() {
        assert!(eligible(
            &candidate_with(Some(6.0)),
            &position_with_gate(6.0)
        ));
        assert!(eligible(
            &candidate_with(Some(8.0)),
            &position_with_gate(6.0)
        ));
    }

    #[test]
    fn absent_qualification_fails_only_when_gated() {
        assert!(!eligible(&candidate_with(None), &position_with_gate(6.0)));
        assert!(eligible(&candidate_with(None), &position_with_gate(0.0)));
    }
}
