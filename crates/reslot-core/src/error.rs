//! Error types for slot tables and commit queues.
//!
//! Stale lookups are not errors: `get` and friends return `None`. The types
//! here cover the checked forms of operations whose unchecked forms panic,
//! plus queue and configuration failures.

use std::error::Error;
use std::fmt;

use crate::id::{Generation, SlotIndex};

/// Errors from releasing or addressing a slot through a handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotError {
    /// The handle's generation no longer matches its slot (already freed,
    /// or the slot has since been reused).
    NotLive {
        /// The slot the handle refers to.
        index: SlotIndex,
        /// The generation encoded in the handle.
        handle_generation: Generation,
        /// The generation currently stored in the slot.
        slot_generation: Generation,
    },
    /// The handle names a slot this table never created. Only possible with
    /// a handle taken from a different table.
    OutOfBounds {
        /// The offending index.
        index: SlotIndex,
        /// Number of slots in the table.
        slot_count: usize,
    },
    /// The slot exhausted its generation counter and was taken out of
    /// circulation.
    Retired {
        /// The retired slot.
        index: SlotIndex,
    },
    /// The handle points at a slot owned by a different table.
    ForeignHandle {
        /// The index encoded in the handle.
        index: SlotIndex,
    },
    /// The payload is currently borrowed through a direct handle and
    /// cannot be released.
    Borrowed {
        /// The borrowed slot.
        index: SlotIndex,
    },
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLive {
                index,
                handle_generation,
                slot_generation,
            } => {
                write!(
                    f,
                    "handle to slot {index} is not live: handle generation {handle_generation}, slot generation {slot_generation}"
                )
            }
            Self::OutOfBounds { index, slot_count } => {
                write!(
                    f,
                    "slot index {index} out of bounds for table with {slot_count} slots"
                )
            }
            Self::Retired { index } => write!(f, "slot {index} is retired"),
            Self::ForeignHandle { index } => {
                write!(f, "handle to slot {index} belongs to a different table")
            }
            Self::Borrowed { index } => {
                write!(f, "payload of slot {index} is borrowed and cannot be released")
            }
        }
    }
}

impl Error for SlotError {}

/// Errors from submitting deferred requests to a commit queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitError {
    /// The queue already holds `capacity` pending requests.
    QueueFull {
        /// Maximum number of pending requests.
        capacity: usize,
    },
    /// The commit queue was dropped; no further requests will be applied.
    Disconnected,
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull { capacity } => {
                write!(f, "commit queue full ({capacity} pending requests)")
            }
            Self::Disconnected => write!(f, "commit queue disconnected"),
        }
    }
}

impl Error for CommitError {}

/// Errors from validating a table configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_generation` must allow at least one reuse of a slot.
    ZeroMaxGeneration,
    /// `initial_capacity` exceeds the number of addressable slots.
    CapacityTooLarge {
        /// The requested capacity.
        requested: usize,
        /// The largest supported capacity.
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxGeneration => write!(f, "max_generation must be at least 1"),
            Self::CapacityTooLarge { requested, max } => {
                write!(
                    f,
                    "initial capacity {requested} exceeds maximum slot count {max}"
                )
            }
        }
    }
}

impl Error for ConfigError {}
