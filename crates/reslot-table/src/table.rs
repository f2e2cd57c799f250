//! The index-tier slot table.
//!
//! [`SlotTable`] owns every payload and mediates all access through
//! [`Handle`]s. Lookups with a stale handle return `None`; releasing a
//! stale handle through [`SlotTable::free`] is a programming error and
//! panics.

use std::ops::{Index, IndexMut};

use reslot_core::{ConfigError, Generation, SlotError, SlotIndex};

use crate::config::TableConfig;
use crate::free_queue::FreeQueue;
use crate::handle::Handle;
use crate::slot::{Slot, Vacated};
use crate::stats::TableStats;

/// Generational slot table.
///
/// Slots live in a single `Vec` and are addressed by index, so a payload
/// may move when the table grows; handles never observe this because they
/// hold an index, not an address. Mutable access requires `&mut self`,
/// which lets the borrow checker rule out aliasing and use-during-free.
/// [`get_disjoint_mut`](SlotTable::get_disjoint_mut) and
/// [`iter_mut`](SlotTable::iter_mut) hand out several disjoint `&mut T`
/// at once.
pub struct SlotTable<T> {
    slots: Vec<Slot<T>>,
    free: FreeQueue,
    live: usize,
    retired: usize,
    config: TableConfig,
}

impl<T> SlotTable<T> {
    /// Create an empty table with the default configuration.
    pub fn new() -> Self {
        Self::from_config(TableConfig::default())
    }

    /// Create an empty table with room for `capacity` payloads before
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(TableConfig {
            initial_capacity: capacity,
            ..TableConfig::default()
        })
    }

    /// Create an empty table with an explicit configuration.
    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: TableConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.initial_capacity),
            free: FreeQueue::with_capacity(config.initial_capacity),
            live: 0,
            retired: 0,
            config,
        }
    }

    /// The configuration this table was built with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Store `value` and return a handle to it.
    ///
    /// Reuses the slot that has been free the longest, keeping its current
    /// generation; if none is free, appends a new slot at generation zero.
    ///
    /// # Panics
    ///
    /// Panics if the table already holds [`TableConfig::MAX_SLOTS`] slots
    /// and none is free.
    pub fn allocate(&mut self, value: T) -> Handle<T> {
        if let Some(index) = self.free.pop_front() {
            let slot = &mut self.slots[index.as_usize()];
            slot.occupy(value);
            self.live += 1;
            return Handle::new(index, slot.generation());
        }

        let index = self.next_index();
        if self.slots.len() == self.slots.capacity() {
            log::trace!(
                "slot table full at {} slots, growing backing storage",
                self.slots.len()
            );
        }
        self.slots.push(Slot::new(value));
        self.live += 1;
        Handle::new(index, Generation::ZERO)
    }

    fn next_index(&self) -> SlotIndex {
        let len = self.slots.len();
        assert!(
            len < TableConfig::MAX_SLOTS,
            "slot table exhausted its index space ({len} slots)"
        );
        SlotIndex(len as u32)
    }

    /// Whether `handle` still refers to the payload it was issued for.
    ///
    /// Does not distinguish "freed" from "freed and reused": both are
    /// simply not live. A handle from a different table may trip a debug
    /// assertion when its index is out of bounds; release builds report it
    /// as not live.
    pub fn is_live(&self, handle: Handle<T>) -> bool {
        self.debug_assert_in_bounds(handle);
        self.slot(handle)
            .is_some_and(|slot| slot.matches(handle.generation))
    }

    fn slot(&self, handle: Handle<T>) -> Option<&Slot<T>> {
        self.slots.get(handle.index.as_usize())
    }

    /// Slots never shrink, so an index past the end means the handle was
    /// issued by another table.
    fn debug_assert_in_bounds(&self, handle: Handle<T>) {
        debug_assert!(
            handle.index.as_usize() < self.slots.len(),
            "{handle} is out of bounds for a table with {} slots",
            self.slots.len()
        );
    }

    /// Shared access to the payload, or `None` if the handle is stale.
    ///
    /// An out-of-bounds handle trips a debug assertion, as in
    /// [`is_live`](Self::is_live).
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.debug_assert_in_bounds(handle);
        let slot = self.slots.get(handle.index.as_usize())?;
        if slot.matches(handle.generation) {
            slot.value()
        } else {
            None
        }
    }

    /// Exclusive access to the payload, or `None` if the handle is stale.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.debug_assert_in_bounds(handle);
        let slot = self.slots.get_mut(handle.index.as_usize())?;
        if slot.matches(handle.generation) {
            slot.value_mut()
        } else {
            None
        }
    }

    /// Exclusive access to several payloads at once.
    ///
    /// Returns `None` if any handle is stale.
    ///
    /// # Panics
    ///
    /// Panics if two handles name the same slot.
    pub fn get_disjoint_mut<const N: usize>(
        &mut self,
        handles: [Handle<T>; N],
    ) -> Option<[&mut T; N]> {
        for &handle in &handles {
            self.debug_assert_in_bounds(handle);
        }
        let indices = handles.map(|h| h.index.as_usize());
        let slots = match self.slots.get_disjoint_mut(indices) {
            Ok(slots) => slots,
            Err(std::slice::GetDisjointMutError::OverlappingIndices) => {
                panic!("get_disjoint_mut called with overlapping handles: {handles:?}")
            }
            Err(std::slice::GetDisjointMutError::IndexOutOfBounds) => return None,
        };
        if slots
            .iter()
            .zip(&handles)
            .any(|(slot, h)| !slot.matches(h.generation))
        {
            return None;
        }
        Some(slots.map(|slot| slot.value_mut().expect("matched slots are occupied")))
    }

    /// Release the payload behind `handle`.
    ///
    /// Drops the payload, advances the slot's generation by one, and queues
    /// the slot for reuse. Every copy of `handle` reads as not live
    /// afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not live: a double free, a free of a handle
    /// whose slot was since reused, or a handle from another table. Letting
    /// these through would queue a slot twice and hand two owners the same
    /// storage.
    pub fn free(&mut self, handle: Handle<T>) {
        if let Err(err) = self.try_free(handle) {
            panic!("double free or invalid handle: {err}");
        }
    }

    /// Release the payload behind `handle`, reporting misuse as an error
    /// instead of panicking.
    pub fn try_free(&mut self, handle: Handle<T>) -> Result<(), SlotError> {
        self.release(handle).map(drop)
    }

    /// Release the payload behind `handle` and return it.
    ///
    /// Returns `None`, leaving the table untouched, if the handle is stale.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        self.release(handle).ok()
    }

    fn release(&mut self, handle: Handle<T>) -> Result<T, SlotError> {
        let slot_count = self.slots.len();
        let index = handle.index;
        let slot = self
            .slots
            .get_mut(index.as_usize())
            .ok_or(SlotError::OutOfBounds { index, slot_count })?;
        if slot.is_retired() {
            return Err(SlotError::Retired { index });
        }
        if !slot.matches(handle.generation) {
            return Err(SlotError::NotLive {
                index,
                handle_generation: handle.generation,
                slot_generation: slot.generation(),
            });
        }
        Ok(self.vacate(index))
    }

    /// Empty an occupied slot and route it to the free queue or retirement.
    fn vacate(&mut self, index: SlotIndex) -> T {
        let slot = &mut self.slots[index.as_usize()];
        let current = slot.generation();
        let next = self.config.next_generation(current);
        let (value, outcome) = slot
            .vacate(next)
            .expect("vacate() is only called on occupied slots");
        self.live -= 1;
        match outcome {
            Vacated::Requeue => self.free.push_back(index),
            Vacated::Retired => {
                self.retired += 1;
                log::warn!(
                    "slot {index} exhausted its generation counter at {current}, retiring it"
                );
            }
        }
        value
    }

    /// Release every live payload, in index order.
    ///
    /// Equivalent to calling [`free`](SlotTable::free) on every live handle:
    /// generations advance and slots join the free queue, so handles issued
    /// before the clear stay dead.
    pub fn clear(&mut self) {
        for i in 0..self.slots.len() {
            if self.slots[i].is_occupied() {
                drop(self.vacate(SlotIndex(i as u32)));
            }
        }
    }

    /// The handle of the payload currently stored at `index`, if any.
    pub fn handle_at(&self, index: SlotIndex) -> Option<Handle<T>> {
        let slot = self.slots.get(index.as_usize())?;
        slot.is_occupied()
            .then(|| Handle::new(index, slot.generation()))
    }

    /// Live payloads with their handles, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let handle = Handle::new(SlotIndex(i as u32), slot.generation());
            slot.value().map(|value| (handle, value))
        })
    }

    /// Live payloads with their handles, in index order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let handle = Handle::new(SlotIndex(i as u32), slot.generation());
            slot.value_mut().map(|value| (handle, value))
        })
    }

    /// Number of live payloads.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no payload is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total slots ever created, live or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Slots permanently out of circulation.
    pub fn retired_count(&self) -> usize {
        self.retired
    }

    /// The slot the next allocation will reuse, if any is free.
    pub fn next_free(&self) -> Option<SlotIndex> {
        self.free.peek()
    }

    /// Current slot accounting.
    pub fn stats(&self) -> TableStats {
        TableStats {
            slots: self.slots.len(),
            live: self.live,
            free: self.free.len(),
            retired: self.retired,
        }
    }

    /// Check every structural invariant, panicking on the first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut queued = vec![false; self.slots.len()];
        for index in self.free.iter() {
            let slot = &self.slots[index.as_usize()];
            assert!(!slot.is_occupied(), "queued slot {index} is occupied");
            assert!(!slot.is_retired(), "queued slot {index} is retired");
            assert!(!queued[index.as_usize()], "slot {index} queued twice");
            queued[index.as_usize()] = true;
        }
        let occupied = self.slots.iter().filter(|s| s.is_occupied()).count();
        let retired = self.slots.iter().filter(|s| s.is_retired()).count();
        assert_eq!(occupied, self.live);
        assert_eq!(retired, self.retired);
        assert_eq!(self.slots.len(), self.live + self.free.len() + self.retired);
    }
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Handle<T>> for SlotTable<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("{handle} is not live"),
        }
    }
}

impl<T> IndexMut<Handle<T>> for SlotTable<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("{handle} is not live"),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SlotTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
