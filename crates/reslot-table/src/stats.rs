//! Occupancy counters for a table.

use std::fmt;

/// Snapshot of a table's slot accounting.
///
/// Every slot is in exactly one of the three states, so
/// `slots == live + free + retired` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Total slots ever created.
    pub slots: usize,
    /// Slots holding a payload.
    pub live: usize,
    /// Vacant slots waiting in the free queue.
    pub free: usize,
    /// Slots permanently out of circulation.
    pub retired: usize,
}

impl TableStats {
    /// Fraction of slots currently holding a payload, in `[0, 1]`.
    pub fn occupancy(&self) -> f64 {
        if self.slots == 0 {
            0.0
        } else {
            self.live as f64 / self.slots as f64
        }
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} slots ({} live, {} free, {} retired)",
            self.slots, self.live, self.free, self.retired
        )
    }
}
