//! Stable-address slot storage for the direct tier.
//!
//! The one place in this crate that contains `unsafe` code. [`StableSlots`]
//! is an append-only list of boxed slots that hands out `&DirectSlot<T>`
//! references tied to a shared borrow of the list itself, so a
//! [`DirectHandle`](crate::DirectHandle) can point straight at its slot
//! while the table keeps allocating.

#![allow(unsafe_code)]

use std::cell::RefCell;

use reslot_core::SlotIndex;

use crate::direct::DirectSlot;

/// Append-only list of individually boxed slots.
///
/// Invariant: a slot, once pushed, is neither removed, replaced, nor moved
/// out of its box until the list itself is dropped or mutably borrowed.
/// Growing the `Vec` moves the boxes, not the slots they point to.
pub(crate) struct StableSlots<T> {
    slots: RefCell<Vec<Box<DirectSlot<T>>>>,
}

impl<T> StableSlots<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: RefCell::new(Vec::with_capacity(capacity)),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Append `slot` and return a reference to it at its final address.
    pub(crate) fn push(&self, slot: DirectSlot<T>) -> &DirectSlot<T> {
        let boxed = Box::new(slot);
        let ptr: *const DirectSlot<T> = {
            let mut slots = self.slots.borrow_mut();
            slots.push(boxed);
            let slot: *const DirectSlot<T> = &**slots.last().expect("slot was just pushed");
            slot
        };
        // SAFETY: `ptr` points into a heap allocation now owned by
        // `self.slots`. Per the type invariant that box is never dropped or
        // moved from while `&self` is alive, and the returned reference
        // cannot outlive `&self`.
        unsafe { &*ptr }
    }

    /// The slot at `index`, if the list has one.
    pub(crate) fn get(&self, index: SlotIndex) -> Option<&DirectSlot<T>> {
        let ptr: *const DirectSlot<T> = {
            let slots = self.slots.borrow();
            let slot: *const DirectSlot<T> = &**slots.get(index.as_usize())?;
            slot
        };
        // SAFETY: as in `push`: the pointee lives in a box owned by
        // `self.slots` that outlives `&self`. The `RefCell` borrow is
        // released before returning, so later pushes do not conflict.
        Some(unsafe { &*ptr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_survive_growth() {
        let slots = StableSlots::with_capacity(1);
        let first = slots.push(DirectSlot::new(SlotIndex(0), 10u64));
        for i in 1..256 {
            slots.push(DirectSlot::new(SlotIndex(i), u64::from(i)));
        }
        assert_eq!(slots.len(), 256);
        assert_eq!(first.index(), SlotIndex(0));
        assert!(std::ptr::eq(first, slots.get(SlotIndex(0)).unwrap()));
        assert!(slots.get(SlotIndex(256)).is_none());
    }
}
