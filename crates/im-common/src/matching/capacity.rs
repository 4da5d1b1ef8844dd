//! Capacity expansion: reduce capacitated matching to one-to-one
//! assignment by splitting each position into unit slots.

use crate::Position;

use super::freeze::FrozenState;

/// One unit of a position's capacity. Exists only for the duration of
/// a run; slot indices restart at 1 per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub position_id: i64,
    /// 1-based index within the position's remaining capacity.
    pub slot_index: u32,
}

/// Expand positions into unit slots, honoring capacity already
/// consumed by frozen prior placements. A position with zero remaining
/// capacity contributes no slots. Slot order follows position input
/// order, which keeps downstream tie-breaking deterministic.
pub fn expand_slots(positions: &[Position], frozen: &FrozenState) -> Vec<Slot> {
    let mut slots = Vec::new();
    for position in positions {
        let remaining = frozen.remaining_capacity(position);
        for slot_index in 1..=remaining {
            slots.push(Slot {
                position_id: position.id,
                slot_index,
            });
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(id: i64, capacity: u32) -> Position {
        Position {
            id,
            capacity,
            ..Position::default()
        }
    }

    #[test]
    fn expands_each_capacity_unit() {
        let positions = [position(1, 2), position(2, 1)];
        let slots = expand_slots(&positions, &FrozenState::default());

        assert_eq!(
            slots,
            vec![
                Slot { position_id: 1, slot_index: 1 },
                Slot { position_id: 1, slot_index: 2 },
                Slot { position_id: 2, slot_index: 1 },
            ]
        );
    }

    #[test]
    fn frozen_capacity_reduces_slots() {
        let positions = [position(1, 3)];
        let frozen = FrozenState::from_committed_pairs(&[(100, 1), (101, 1)]);
        let slots = expand_slots(&positions, &frozen);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].slot_index, 1);
    }

    #[test]
    fn fully_consumed_position_contributes_nothing() {
        let positions = [position(1, 1), position(2, 1)];
        let frozen = FrozenState::from_committed_pairs(&[(100, 1)]);
        let slots = expand_slots(&positions, &frozen);
        assert_eq!(slots, vec![Slot { position_id: 2, slot_index: 1 }]);
    }

    #[test]
    fn overconsumed_capacity_floors_at_zero() {
        let positions = [position(1, 1)];
        let frozen = FrozenState::from_committed_pairs(&[(100, 1), (101, 1)]);
        assert!(expand_slots(&positions, &frozen).is_empty());
    }
}
