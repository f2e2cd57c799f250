//! Reusable payload fixtures.
//!
//! - [`DropCounter`]: shared counter handing out [`TrackedPayload`]s.
//! - [`TrackedPayload`]: increments its counter exactly once when dropped.
//! - [`Entity`]: a plain game entity with a name, position, and health.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts how many [`TrackedPayload`]s created from it have been dropped.
///
/// Cloning shares the counter, so a clone can be moved into another thread
/// while the test keeps the original for assertions.
#[derive(Clone, Default)]
pub struct DropCounter {
    drops: Arc<AtomicUsize>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A payload tagged with `id` that reports its drop to this counter.
    pub fn payload(&self, id: u32) -> TrackedPayload {
        TrackedPayload {
            id,
            drops: Arc::clone(&self.drops),
        }
    }

    /// Number of payloads dropped so far.
    pub fn count(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for DropCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropCounter")
            .field("drops", &self.count())
            .finish()
    }
}

/// Payload whose destructor is observable through its [`DropCounter`].
pub struct TrackedPayload {
    pub id: u32,
    drops: Arc<AtomicUsize>,
}

impl Drop for TrackedPayload {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl PartialEq for TrackedPayload {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for TrackedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TrackedPayload").field(&self.id).finish()
    }
}

/// Minimal game entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub name: String,
    pub position: [f32; 2],
    pub health: i32,
}

impl Entity {
    /// Starting health of a fresh entity.
    pub const FULL_HEALTH: i32 = 100;

    /// An entity at the origin with full health.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: [0.0, 0.0],
            health: Self::FULL_HEALTH,
        }
    }

    /// The same entity moved to `position`.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }
}
