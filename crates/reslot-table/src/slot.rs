//! Slot storage for the index tier.
//!
//! A [`Slot`] pairs a generation counter with payload storage that is either
//! occupied, vacant (waiting in the free queue), or retired.

use reslot_core::Generation;

/// Occupancy of a slot.
#[derive(Debug)]
enum SlotState<T> {
    /// Holds exactly one live payload.
    Occupied(T),
    /// Empty and queued for reuse.
    Vacant,
    /// Empty and permanently out of circulation.
    Retired,
}

/// One reusable unit of table storage.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    generation: Generation,
    state: SlotState<T>,
}

/// Outcome of vacating a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Vacated {
    /// The slot advanced its generation and should be queued for reuse.
    Requeue,
    /// The slot's generation is exhausted; it must not be queued.
    Retired,
}

impl<T> Slot<T> {
    /// A fresh slot at generation zero holding `value`.
    pub(crate) fn new(value: T) -> Self {
        Self {
            generation: Generation::ZERO,
            state: SlotState::Occupied(value),
        }
    }

    pub(crate) fn generation(&self) -> Generation {
        self.generation
    }

    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self.state, SlotState::Occupied(_))
    }

    pub(crate) fn is_retired(&self) -> bool {
        matches!(self.state, SlotState::Retired)
    }

    /// Whether a handle carrying `generation` refers to the current occupant.
    pub(crate) fn matches(&self, generation: Generation) -> bool {
        self.is_occupied() && self.generation == generation
    }

    pub(crate) fn value(&self) -> Option<&T> {
        match &self.state {
            SlotState::Occupied(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            SlotState::Occupied(value) => Some(value),
            _ => None,
        }
    }

    /// Move `value` into a vacant slot. The generation is unchanged.
    pub(crate) fn occupy(&mut self, value: T) {
        debug_assert!(
            matches!(self.state, SlotState::Vacant),
            "occupy() on a slot that is not vacant"
        );
        self.state = SlotState::Occupied(value);
    }

    /// Take the payload out of an occupied slot.
    ///
    /// `next` is the generation to advance to; `None` retires the slot and
    /// leaves its generation where it was.
    pub(crate) fn vacate(&mut self, next: Option<Generation>) -> Option<(T, Vacated)> {
        if !self.is_occupied() {
            return None;
        }
        let (state, outcome) = match next {
            Some(generation) => {
                self.generation = generation;
                (SlotState::Vacant, Vacated::Requeue)
            }
            None => (SlotState::Retired, Vacated::Retired),
        };
        match std::mem::replace(&mut self.state, state) {
            SlotState::Occupied(value) => Some((value, outcome)),
            _ => unreachable!("occupancy checked above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_occupied_at_generation_zero() {
        let slot = Slot::new(5u32);
        assert!(slot.matches(Generation::ZERO));
        assert_eq!(slot.value(), Some(&5));
    }

    #[test]
    fn vacate_advances_generation_and_returns_payload() {
        let mut slot = Slot::new("a");
        let (value, outcome) = slot.vacate(Some(Generation(1))).unwrap();
        assert_eq!(value, "a");
        assert_eq!(outcome, Vacated::Requeue);
        assert_eq!(slot.generation(), Generation(1));
        assert!(!slot.is_occupied());
        assert!(!slot.matches(Generation(1)));
    }

    #[test]
    fn vacate_without_next_generation_retires() {
        let mut slot = Slot::new(1u8);
        let (_, outcome) = slot.vacate(None).unwrap();
        assert_eq!(outcome, Vacated::Retired);
        assert!(slot.is_retired());
        assert_eq!(slot.generation(), Generation::ZERO);
    }

    #[test]
    fn vacate_empty_slot_is_none() {
        let mut slot = Slot::new(1u8);
        slot.vacate(Some(Generation(1))).unwrap();
        assert!(slot.vacate(Some(Generation(2))).is_none());
        assert_eq!(slot.generation(), Generation(1));
    }

    #[test]
    fn occupy_keeps_generation() {
        let mut slot = Slot::new(1u8);
        slot.vacate(Some(Generation(1))).unwrap();
        slot.occupy(2);
        assert!(slot.matches(Generation(1)));
        assert_eq!(slot.value_mut(), Some(&mut 2));
    }
}
