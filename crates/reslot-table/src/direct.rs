//! The direct tier: handles that dereference without the table.
//!
//! A [`DirectHandle`] holds a reference to its slot plus the generation it
//! was issued for, so liveness checks and payload access are a single
//! pointer hop. The handle borrows the [`DirectTable`] for `'t`, which is
//! how the "table outlives every handle" obligation is enforced.
//!
//! # Access policy
//!
//! Each slot keeps its payload in its own `RefCell`, so different entities
//! can be mutated at the same time through different handles. Two access
//! styles are offered:
//!
//! - [`DirectHandle::try_borrow`] / [`DirectHandle::try_borrow_mut`] check
//!   liveness and return `None` for a stale handle.
//! - [`DirectHandle::borrow`] / [`DirectHandle::borrow_mut`] assume the
//!   handle is live. Debug builds assert it. Release builds skip the check:
//!   a stale handle whose slot has been reused reads the new occupant, and
//!   one whose slot is still empty panics. Neither case is memory-unsafe.
//!
//! Borrowing the same slot mutably twice panics, as with any `RefCell`.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;

use reslot_core::{ConfigError, Generation, SlotError, SlotIndex};

use crate::config::TableConfig;
use crate::free_queue::FreeQueue;
use crate::handle::Handle;
use crate::raw::StableSlots;
use crate::stats::TableStats;

/// A slot with interior mutability and a fixed address.
pub(crate) struct DirectSlot<T> {
    index: SlotIndex,
    generation: Cell<Generation>,
    occupied: Cell<bool>,
    retired: Cell<bool>,
    value: RefCell<Option<T>>,
}

impl<T> DirectSlot<T> {
    pub(crate) fn new(index: SlotIndex, value: T) -> Self {
        Self {
            index,
            generation: Cell::new(Generation::ZERO),
            occupied: Cell::new(true),
            retired: Cell::new(false),
            value: RefCell::new(Some(value)),
        }
    }

    /// Position of this slot in its table.
    pub(crate) fn index(&self) -> SlotIndex {
        self.index
    }

    /// Current generation of this slot.
    pub(crate) fn generation(&self) -> Generation {
        self.generation.get()
    }

    fn matches(&self, generation: Generation) -> bool {
        self.occupied.get() && self.generation.get() == generation
    }
}

/// Reference to a payload in a [`DirectTable`] that needs no table to
/// dereference.
pub struct DirectHandle<'t, T> {
    slot: &'t DirectSlot<T>,
    generation: Generation,
}

impl<'t, T> DirectHandle<'t, T> {
    /// Whether the slot still holds the payload this handle was issued for.
    pub fn is_live(&self) -> bool {
        self.slot.matches(self.generation)
    }

    /// The slot this handle refers to.
    pub fn index(&self) -> SlotIndex {
        self.slot.index
    }

    /// The slot's generation when this handle was issued.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The equivalent index handle, which can be stored without borrowing
    /// the table and resolved again with [`DirectTable::resolve`].
    pub fn to_index(&self) -> Handle<T> {
        Handle::new(self.slot.index, self.generation)
    }

    /// Shared access to the payload, or `None` if the handle is stale or
    /// the payload is mutably borrowed elsewhere.
    pub fn try_borrow(&self) -> Option<Ref<'t, T>> {
        if !self.is_live() {
            return None;
        }
        let value = self.slot.value.try_borrow().ok()?;
        Ref::filter_map(value, Option::as_ref).ok()
    }

    /// Exclusive access to the payload, or `None` if the handle is stale or
    /// the payload is borrowed elsewhere.
    pub fn try_borrow_mut(&self) -> Option<RefMut<'t, T>> {
        if !self.is_live() {
            return None;
        }
        let value = self.slot.value.try_borrow_mut().ok()?;
        RefMut::filter_map(value, Option::as_mut).ok()
    }

    /// Shared access to the payload, assuming the handle is live.
    ///
    /// # Panics
    ///
    /// Panics if the payload is mutably borrowed, or if the slot is empty.
    /// Debug builds also panic if the handle is stale.
    pub fn borrow(&self) -> Ref<'t, T> {
        debug_assert!(self.is_live(), "{self} dereferenced after free");
        Ref::map(self.slot.value.borrow(), |value| match value {
            Some(value) => value,
            None => panic!("direct handle dereferenced an empty slot"),
        })
    }

    /// Exclusive access to the payload, assuming the handle is live.
    ///
    /// # Panics
    ///
    /// Panics if the payload is already borrowed, or if the slot is empty.
    /// Debug builds also panic if the handle is stale.
    pub fn borrow_mut(&self) -> RefMut<'t, T> {
        debug_assert!(self.is_live(), "{self} dereferenced after free");
        RefMut::map(self.slot.value.borrow_mut(), |value| match value {
            Some(value) => value,
            None => panic!("direct handle dereferenced an empty slot"),
        })
    }
}

impl<T> Clone for DirectHandle<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DirectHandle<'_, T> {}

impl<T> PartialEq for DirectHandle<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.slot, other.slot) && self.generation == other.generation
    }
}

impl<T> Eq for DirectHandle<'_, T> {}

impl<T> fmt::Debug for DirectHandle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectHandle")
            .field("index", &self.slot.index.0)
            .field("generation", &self.generation.0)
            .finish()
    }
}

impl<T> fmt::Display for DirectHandle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectHandle({}v{})", self.slot.index, self.generation)
    }
}

/// Slot table whose handles point directly at their slots.
///
/// Slots are boxed individually and never move, so handles stay valid as
/// the table grows. Every operation takes `&self`; the table is `!Sync`
/// and meant to be owned by a single thread.
pub struct DirectTable<T> {
    slots: StableSlots<T>,
    free: RefCell<FreeQueue>,
    live: Cell<usize>,
    retired: Cell<usize>,
    config: TableConfig,
}

impl<T> DirectTable<T> {
    /// Create an empty table with the default configuration.
    pub fn new() -> Self {
        Self::from_config(TableConfig::default())
    }

    /// Create an empty table with an explicit configuration.
    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: TableConfig) -> Self {
        Self {
            slots: StableSlots::with_capacity(config.initial_capacity),
            free: RefCell::new(FreeQueue::new()),
            live: Cell::new(0),
            retired: Cell::new(0),
            config,
        }
    }

    /// The configuration this table was built with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Store `value` and return a direct handle to it.
    ///
    /// Same reuse rules as [`SlotTable::allocate`](crate::SlotTable::allocate).
    pub fn allocate(&self, value: T) -> DirectHandle<'_, T> {
        let reused = self.free.borrow_mut().pop_front();
        let slot = match reused.and_then(|index| self.slots.get(index)) {
            Some(slot) => {
                *slot.value.borrow_mut() = Some(value);
                slot.occupied.set(true);
                slot
            }
            None => {
                let len = self.slots.len();
                assert!(
                    len < TableConfig::MAX_SLOTS,
                    "direct table exhausted its index space ({len} slots)"
                );
                self.slots.push(DirectSlot::new(SlotIndex(len as u32), value))
            }
        };
        self.live.set(self.live.get() + 1);
        DirectHandle {
            slot,
            generation: slot.generation(),
        }
    }

    /// Whether an index handle refers to a live payload in this table.
    pub fn is_live(&self, handle: Handle<T>) -> bool {
        self.resolve(handle).is_some()
    }

    /// Turn an index handle back into a direct handle, or `None` if it is
    /// stale or out of bounds.
    pub fn resolve(&self, handle: Handle<T>) -> Option<DirectHandle<'_, T>> {
        let slot = self.slots.get(handle.index)?;
        slot.matches(handle.generation).then_some(DirectHandle {
            slot,
            generation: handle.generation,
        })
    }

    /// Release the payload behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live (double free), belongs to another
    /// table, or its payload is currently borrowed.
    pub fn free(&self, handle: DirectHandle<'_, T>) {
        if let Err(err) = self.try_free(handle) {
            panic!("double free or invalid handle: {err}");
        }
    }

    /// Release the payload behind `handle`, reporting misuse as an error.
    pub fn try_free(&self, handle: DirectHandle<'_, T>) -> Result<(), SlotError> {
        self.release(handle).map(drop)
    }

    /// Release the payload behind an index handle, reporting misuse as an
    /// error.
    pub fn try_free_index(&self, handle: Handle<T>) -> Result<(), SlotError> {
        let slot = self
            .slots
            .get(handle.index)
            .ok_or(SlotError::OutOfBounds {
                index: handle.index,
                slot_count: self.slots.len(),
            })?;
        self.release(DirectHandle {
            slot,
            generation: handle.generation,
        })
        .map(drop)
    }

    /// Release the payload behind `handle` and return it, or `None` if the
    /// handle cannot be released.
    pub fn remove(&self, handle: DirectHandle<'_, T>) -> Option<T> {
        self.release(handle).ok()
    }

    fn release(&self, handle: DirectHandle<'_, T>) -> Result<T, SlotError> {
        let index = handle.index();
        let slot = match self.slots.get(index) {
            Some(slot) if std::ptr::eq(slot, handle.slot) => slot,
            _ => return Err(SlotError::ForeignHandle { index }),
        };
        if slot.retired.get() {
            return Err(SlotError::Retired { index });
        }
        if !slot.matches(handle.generation) {
            return Err(SlotError::NotLive {
                index,
                handle_generation: handle.generation,
                slot_generation: slot.generation(),
            });
        }
        let value = {
            let mut guard = slot
                .value
                .try_borrow_mut()
                .map_err(|_| SlotError::Borrowed { index })?;
            guard.take().expect("occupied slots hold a payload")
        };
        slot.occupied.set(false);
        self.live.set(self.live.get() - 1);

        let current = slot.generation();
        match self.config.next_generation(current) {
            Some(next) => {
                slot.generation.set(next);
                self.free.borrow_mut().push_back(index);
            }
            None => {
                slot.retired.set(true);
                self.retired.set(self.retired.get() + 1);
                log::warn!(
                    "slot {index} exhausted its generation counter at {current}, retiring it"
                );
            }
        }
        Ok(value)
    }

    /// Direct handles to every live payload, in index order.
    pub fn iter(&self) -> impl Iterator<Item = DirectHandle<'_, T>> + '_ {
        (0..self.slots.len()).filter_map(move |i| {
            let slot = self.slots.get(SlotIndex(i as u32))?;
            slot.occupied.get().then(|| DirectHandle {
                slot,
                generation: slot.generation(),
            })
        })
    }

    /// Number of live payloads.
    pub fn len(&self) -> usize {
        self.live.get()
    }

    /// Whether no payload is live.
    pub fn is_empty(&self) -> bool {
        self.live.get() == 0
    }

    /// Total slots ever created.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free.borrow().len()
    }

    /// Current slot accounting.
    pub fn stats(&self) -> TableStats {
        TableStats {
            slots: self.slots.len(),
            live: self.live.get(),
            free: self.free.borrow().len(),
            retired: self.retired.get(),
        }
    }
}

impl<T> Default for DirectTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reslot_test_utils::{DropCounter, Entity};

    #[test]
    fn fifo_reuse_scenario() {
        let table = DirectTable::new();
        let a = table.allocate("a");
        let b = table.allocate("b");
        assert_eq!((a.index(), a.generation()), (SlotIndex(0), Generation(0)));
        assert_eq!((b.index(), b.generation()), (SlotIndex(1), Generation(0)));

        table.free(a);
        let c = table.allocate("c");
        assert_eq!((c.index(), c.generation()), (SlotIndex(0), Generation(1)));

        assert!(!a.is_live());
        assert!(b.is_live());
        assert!(c.is_live());
        assert_eq!(*c.borrow(), "c");
    }

    #[test]
    fn handles_mutate_disjoint_slots_concurrently() {
        let table = DirectTable::new();
        let a = table.allocate(Entity::new("a"));
        let b = table.allocate(Entity::new("b"));
        let mut ea = a.borrow_mut();
        let mut eb = b.borrow_mut();
        ea.health -= 10;
        eb.health -= 20;
        drop((ea, eb));
        assert_eq!(a.borrow().health, 90);
        assert_eq!(b.borrow().health, 80);
    }

    #[test]
    fn handles_survive_table_growth() {
        let table = DirectTable::new();
        let first = table.allocate(0usize);
        let rest: Vec<_> = (1..1000).map(|i| table.allocate(i)).collect();
        assert_eq!(*first.borrow(), 0);
        assert_eq!(*rest[998].borrow(), 999);
    }

    #[test]
    fn try_borrow_is_none_after_free() {
        let table = DirectTable::new();
        let h = table.allocate(5);
        table.free(h);
        assert!(!h.is_live());
        assert!(h.try_borrow().is_none());
        assert!(h.try_borrow_mut().is_none());
    }

    #[test]
    fn try_borrow_mut_is_none_while_shared_borrowed() {
        let table = DirectTable::new();
        let h = table.allocate(5);
        let shared = h.borrow();
        assert!(h.try_borrow_mut().is_none());
        assert_eq!(*h.try_borrow().unwrap(), 5);
        drop(shared);
        *h.try_borrow_mut().unwrap() += 1;
        assert_eq!(*h.borrow(), 6);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "dereferenced after free")]
    fn borrow_stale_handle_panics_in_debug() {
        let table = DirectTable::new();
        let h = table.allocate(1);
        table.free(h);
        let _reused = table.allocate(2);
        let _ = h.borrow();
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn borrow_stale_handle_reads_new_occupant_in_release() {
        let table = DirectTable::new();
        let h = table.allocate(1);
        table.free(h);
        let reused = table.allocate(2);
        assert_eq!(reused.index(), h.index());
        assert!(!h.is_live());
        assert_eq!(*h.borrow(), 2);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    #[should_panic(expected = "empty slot")]
    fn borrow_stale_handle_of_vacant_slot_panics_in_release() {
        let table = DirectTable::new();
        let h = table.allocate(1);
        table.free(h);
        let _ = h.borrow();
    }

    #[test]
    fn wrap_policy_reuses_exhausted_slot_from_generation_zero() {
        let config = TableConfig {
            max_generation: Generation(2),
            generation_policy: crate::config::GenerationPolicy::Wrap,
            ..Default::default()
        };
        let table = DirectTable::with_config(config).unwrap();
        let first = table.allocate("g0");
        let first_index = first.to_index();
        table.free(first);
        let second = table.allocate("g1");
        table.free(second);
        let third = table.allocate("g2");
        assert_eq!(third.generation(), Generation(2));
        table.free(third);

        let wrapped = table.allocate("g0 again");
        assert_eq!(wrapped.index(), SlotIndex(0));
        assert_eq!(wrapped.generation(), Generation::ZERO);
        assert_eq!(table.slot_count(), 1);
        assert_eq!(table.stats().retired, 0);
        // The first handle aliases the new occupant once the counter wraps.
        assert!(first.is_live());
        assert_eq!(table.resolve(first_index), Some(wrapped));
        assert!(!second.is_live());
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn double_free_panics() {
        let table = DirectTable::new();
        let h = table.allocate(1u8);
        table.free(h);
        table.free(h);
    }

    #[test]
    fn free_while_borrowed_is_rejected() {
        let table = DirectTable::new();
        let h = table.allocate(String::from("busy"));
        let guard = h.borrow();
        assert_eq!(
            table.try_free(h),
            Err(SlotError::Borrowed { index: SlotIndex(0) })
        );
        drop(guard);
        assert!(h.is_live());
        assert_eq!(table.remove(h).as_deref(), Some("busy"));
    }

    #[test]
    fn foreign_handle_is_rejected() {
        let a = DirectTable::new();
        let b = DirectTable::new();
        let ha = a.allocate(1);
        let _hb = b.allocate(2);
        assert_eq!(
            b.try_free(ha),
            Err(SlotError::ForeignHandle { index: SlotIndex(0) })
        );
        assert!(ha.is_live());
    }

    #[test]
    fn index_handle_round_trip() {
        let table = DirectTable::new();
        let h = table.allocate('q');
        let stored = h.to_index();
        assert!(table.is_live(stored));
        assert_eq!(table.resolve(stored), Some(h));
        table.free(h);
        assert!(!table.is_live(stored));
        assert!(table.resolve(stored).is_none());
    }

    #[test]
    fn try_free_index_classifies_errors() {
        let table = DirectTable::new();
        let h = table.allocate(1).to_index();
        assert_eq!(table.try_free_index(h), Ok(()));
        assert_eq!(
            table.try_free_index(h),
            Err(SlotError::NotLive {
                index: SlotIndex(0),
                handle_generation: Generation(0),
                slot_generation: Generation(1),
            })
        );
        let other = DirectTable::new();
        let _ = other.allocate(0);
        let far = other.allocate(0).to_index();
        assert_eq!(
            table.try_free_index(far),
            Err(SlotError::OutOfBounds {
                index: SlotIndex(1),
                slot_count: 1,
            })
        );
    }

    #[test]
    fn payload_dropped_once_and_on_table_drop() {
        let drops = DropCounter::new();
        {
            let table = DirectTable::new();
            let a = table.allocate(drops.payload(1));
            let _b = table.allocate(drops.payload(2));
            table.free(a);
            assert_eq!(drops.count(), 1);
        }
        assert_eq!(drops.count(), 2);
    }

    #[test]
    fn retire_policy_applies_to_direct_slots() {
        let config = TableConfig {
            max_generation: Generation(1),
            ..TableConfig::new()
        };
        let table = DirectTable::with_config(config).unwrap();
        let g0 = table.allocate(0);
        table.free(g0);
        let g1 = table.allocate(1);
        assert_eq!(g1.index(), SlotIndex(0));
        table.free(g1);
        let fresh = table.allocate(2);
        assert_eq!(fresh.index(), SlotIndex(1));
        assert_eq!(
            table.stats(),
            TableStats {
                slots: 2,
                live: 1,
                free: 0,
                retired: 1,
            }
        );
        assert_eq!(table.try_free(g1), Err(SlotError::Retired { index: SlotIndex(0) }));
    }

    #[test]
    fn iter_yields_live_handles_in_index_order() {
        let table = DirectTable::new();
        let a = table.allocate(1);
        let b = table.allocate(2);
        let c = table.allocate(3);
        table.free(b);
        let live: Vec<_> = table.iter().collect();
        assert_eq!(live, vec![a, c]);
        for h in table.iter() {
            *h.borrow_mut() *= 10;
        }
        assert_eq!(*a.borrow() + *c.borrow(), 40);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn direct_and_index_tiers_agree(
                frees in proptest::collection::vec(any::<bool>(), 1..64),
            ) {
                let direct = DirectTable::new();
                let mut indexed = crate::SlotTable::new();
                for (i, &free) in frees.iter().enumerate() {
                    let d = direct.allocate(i);
                    let x = indexed.allocate(i);
                    prop_assert_eq!(d.to_index(), x);
                    if free {
                        direct.free(d);
                        indexed.free(x);
                    }
                }
                prop_assert_eq!(direct.stats(), indexed.stats());
            }
        }
    }
}
