//! FIFO queue of reusable slot indices.
//!
//! Reuse is first-in first-out: the slot freed longest ago is handed out
//! first. LIFO reuse would cycle a handful of hot slots and burn through
//! their generation counters, while FIFO spreads generation consumption
//! across every slot in the table.

use std::collections::VecDeque;

use reslot_core::SlotIndex;

/// Queue of vacant slot indices awaiting reuse.
///
/// Callers push an index only when its slot transitions from occupied to
/// vacant, so an index is never queued twice.
#[derive(Clone, Debug, Default)]
pub struct FreeQueue {
    queue: VecDeque<SlotIndex>,
}

impl FreeQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Create an empty queue with room for `capacity` indices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a freed index to the back of the queue.
    pub fn push_back(&mut self, index: SlotIndex) {
        self.queue.push_back(index);
    }

    /// Take the index that has waited longest.
    pub fn pop_front(&mut self) -> Option<SlotIndex> {
        self.queue.pop_front()
    }

    /// The index the next `pop_front` will return.
    pub fn peek(&self) -> Option<SlotIndex> {
        self.queue.front().copied()
    }

    /// Number of queued indices.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no index is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether `index` is queued. O(n).
    pub fn contains(&self, index: SlotIndex) -> bool {
        self.queue.contains(&index)
    }

    /// Queued indices, front first.
    pub fn iter(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_push_order() {
        let mut q = FreeQueue::new();
        q.push_back(SlotIndex(4));
        q.push_back(SlotIndex(1));
        q.push_back(SlotIndex(9));
        assert_eq!(q.peek(), Some(SlotIndex(4)));
        assert_eq!(q.pop_front(), Some(SlotIndex(4)));
        assert_eq!(q.pop_front(), Some(SlotIndex(1)));
        assert_eq!(q.pop_front(), Some(SlotIndex(9)));
        assert_eq!(q.pop_front(), None);
    }

    #[test]
    fn contains_and_len_track_queue() {
        let mut q = FreeQueue::with_capacity(4);
        assert!(q.is_empty());
        q.push_back(SlotIndex(2));
        assert!(q.contains(SlotIndex(2)));
        assert!(!q.contains(SlotIndex(3)));
        assert_eq!(q.len(), 1);
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![SlotIndex(2)]);
    }
}
