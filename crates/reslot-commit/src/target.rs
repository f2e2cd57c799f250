//! Tables a commit queue can apply requests to.

use reslot_core::SlotError;
use reslot_table::{DirectTable, Handle, SlotTable};

/// Storage that accepts committed spawn and despawn requests.
///
/// Implemented for both table tiers. Direct tables report the index form
/// of each new handle, since direct handles cannot outlive the commit's
/// borrow of the table.
pub trait CommitTarget<T> {
    /// Store a spawned payload.
    fn insert(&mut self, value: T) -> Handle<T>;

    /// Release a despawned payload.
    fn release(&mut self, handle: Handle<T>) -> Result<(), SlotError>;
}

impl<T> CommitTarget<T> for SlotTable<T> {
    fn insert(&mut self, value: T) -> Handle<T> {
        self.allocate(value)
    }

    fn release(&mut self, handle: Handle<T>) -> Result<(), SlotError> {
        self.try_free(handle)
    }
}

impl<T> CommitTarget<T> for DirectTable<T> {
    fn insert(&mut self, value: T) -> Handle<T> {
        self.allocate(value).to_index()
    }

    fn release(&mut self, handle: Handle<T>) -> Result<(), SlotError> {
        self.try_free_index(handle)
    }
}
