//! Strongly-typed identifiers for slots, generations, and deferred requests.

use std::fmt;

/// Position of a slot within a table's backing storage.
///
/// Indices are assigned sequentially as the table grows and never change
/// for the lifetime of the table. `SlotIndex(n)` is the n-th slot created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// The index as a `usize`, for addressing backing storage.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Reuse counter of a slot.
///
/// Starts at zero when a slot is created and advances by exactly one each
/// time the slot is freed. A handle is live only while its generation
/// equals the generation stored in its slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u32);

impl Generation {
    /// The generation of a freshly created slot.
    pub const ZERO: Self = Self(0);

    /// The next generation, or `None` if it would exceed `max`.
    pub fn checked_next(self, max: Generation) -> Option<Self> {
        if self.0 >= max.0 {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    /// The next generation, wrapping to zero past `max`.
    pub fn wrapping_next(self, max: Generation) -> Self {
        self.checked_next(max).unwrap_or(Self::ZERO)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Generation {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Sequence number of a deferred spawn request.
///
/// Assigned from a monotonic counter shared by every spawner of a commit
/// queue, so tickets order requests by arrival across threads. The ticket
/// is exchanged for a handle when the request is committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for Ticket {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
