//! Outcome of applying a batch of deferred requests.

use indexmap::IndexMap;
use reslot_core::Ticket;
use reslot_table::Handle;
use smallvec::SmallVec;

/// What a [`CommitQueue::commit`](crate::CommitQueue::commit) call did.
#[derive(Debug)]
pub struct CommitReport<T> {
    /// Handles issued for spawn requests, keyed by ticket, in the order
    /// the requests were applied.
    pub spawned: IndexMap<Ticket, Handle<T>>,
    /// Number of payloads released by despawn requests.
    pub despawned: usize,
    /// Despawn requests whose handle was no longer live when applied,
    /// typically because two systems destroyed the same entity in one
    /// frame.
    pub stale: SmallVec<[Handle<T>; 4]>,
}

impl<T> CommitReport<T> {
    pub(crate) fn new() -> Self {
        Self {
            spawned: IndexMap::new(),
            despawned: 0,
            stale: SmallVec::new(),
        }
    }

    /// The handle issued for a spawn ticket, if it was applied in this
    /// commit.
    pub fn handle_for(&self, ticket: Ticket) -> Option<Handle<T>> {
        self.spawned.get(&ticket).copied()
    }

    /// Whether the commit applied nothing at all.
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.despawned == 0 && self.stale.is_empty()
    }

    /// Total requests processed, including stale despawns.
    pub fn request_count(&self) -> usize {
        self.spawned.len() + self.despawned + self.stale.len()
    }
}

impl<T> Default for CommitReport<T> {
    fn default() -> Self {
        Self::new()
    }
}
