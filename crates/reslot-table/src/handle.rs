//! Index handles.
//!
//! A [`Handle`] names a slot by position and records the slot's generation
//! at the time of allocation. The generation allows O(1) staleness checks
//! against the owning table without any other bookkeeping.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use reslot_core::{Generation, SlotIndex};

/// Checked reference to a payload stored in a [`SlotTable`](crate::SlotTable).
///
/// Handles are only minted by a table. They are `Copy`, carry no borrow of
/// the table, and are `Send + Sync` whatever the payload type, so they can
/// be stored in other entities or sent to other threads freely. Every
/// dereference goes through the table and yields `None` once the slot has
/// been freed.
#[must_use]
pub struct Handle<T> {
    pub(crate) index: SlotIndex,
    pub(crate) generation: Generation,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: SlotIndex, generation: Generation) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// The slot this handle refers to.
    pub fn index(&self) -> SlotIndex {
        self.index
    }

    /// The slot's generation when this handle was issued.
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.index, self.generation).cmp(&(other.index, other.generation))
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.index.0)
            .field("generation", &self.generation.0)
            .finish()
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct NotClone;

    #[test]
    fn accessors_return_constructor_values() {
        let h: Handle<NotClone> = Handle::new(SlotIndex(3), Generation(7));
        assert_eq!(h.index(), SlotIndex(3));
        assert_eq!(h.generation(), Generation(7));
    }

    #[test]
    fn copy_does_not_require_payload_traits() {
        let h: Handle<NotClone> = Handle::new(SlotIndex(0), Generation(0));
        let copy = h;
        assert_eq!(h, copy);
    }

    #[test]
    fn display_shows_index_and_generation() {
        let h: Handle<u8> = Handle::new(SlotIndex(3), Generation(2));
        assert_eq!(h.to_string(), "Handle(3v2)");
    }

    #[test]
    fn same_index_different_generation_are_distinct() {
        let a: Handle<u8> = Handle::new(SlotIndex(1), Generation(0));
        let b: Handle<u8> = Handle::new(SlotIndex(1), Generation(1));
        assert_ne!(a, b);
        assert!(a < b);
        let set: HashSet<_> = [a, b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn handle_is_send_and_sync_for_any_payload() {
        fn assert_send_sync<X: Send + Sync>() {}
        assert_send_sync::<Handle<std::rc::Rc<u8>>>();
    }
}
