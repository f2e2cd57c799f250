//! Reslot: a generational slot allocator for long-lived entity handles.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all reslot sub-crates. For most users, adding `reslot` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use reslot::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Enemy {
//!     hp: i32,
//! }
//!
//! let mut table = SlotTable::new();
//! let a = table.allocate(Enemy { hp: 10 });
//! let b = table.allocate(Enemy { hp: 20 });
//!
//! table.get_mut(a).unwrap().hp -= 10;
//! table.free(a);
//!
//! // The freed slot is reused, but the old handle stays dead.
//! let c = table.allocate(Enemy { hp: 30 });
//! assert_eq!(c.index(), a.index());
//! assert!(c.generation() > a.generation());
//! assert!(table.get(a).is_none());
//! assert_eq!(table.get(b), Some(&Enemy { hp: 20 }));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `reslot-core` | Ids and error types |
//! | [`table`] | `reslot-table` | `SlotTable`, `DirectTable`, handles, configuration |
//! | [`commit`] | `reslot-commit` | Deferred spawn/despawn queue |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core ids and error types (`reslot-core`).
pub use reslot_core as types;

/// Slot tables and handles (`reslot-table`).
///
/// [`table::SlotTable`] is the checked index tier; [`table::DirectTable`]
/// hands out handles that dereference without the table.
pub use reslot_table as table;

/// Deferred spawn/despawn queue (`reslot-commit`).
///
/// Lets any thread request creation or destruction while the owning
/// thread applies everything at one point per frame.
pub use reslot_commit as commit;

/// Common imports for typical usage.
///
/// ```rust
/// use reslot::prelude::*;
/// ```
pub mod prelude {
    pub use reslot_commit::{CommitQueue, CommitReport, CommitTarget, SpawnError, Spawner};
    pub use reslot_core::{CommitError, ConfigError, Generation, SlotError, SlotIndex, Ticket};
    pub use reslot_table::{
        DirectHandle, DirectTable, GenerationPolicy, Handle, SlotTable, TableConfig, TableStats,
    };
}
