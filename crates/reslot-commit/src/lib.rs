//! Deferred spawn/despawn requests applied at a single commit point.
//!
//! Slot tables are not thread-safe for mutation. Instead of locking them,
//! any thread submits creation and destruction requests through a
//! [`Spawner`], and the thread that owns the table applies them all at a
//! known point in its frame with [`CommitQueue::commit`]. Between commits
//! the owner may hand out disjoint mutable borrows freely.
//!
//! ```
//! use reslot_commit::CommitQueue;
//! use reslot_table::SlotTable;
//!
//! let mut table = SlotTable::new();
//! let mut queue = CommitQueue::new(64);
//! let spawner = queue.spawner();
//!
//! let ticket = std::thread::spawn(move || spawner.spawn("bullet").unwrap())
//!     .join()
//!     .unwrap();
//!
//! let report = queue.commit(&mut table);
//! let bullet = report.handle_for(ticket).unwrap();
//! assert_eq!(table.get(bullet), Some(&"bullet"));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod queue;
pub mod report;
pub mod target;

pub use error::SpawnError;
pub use queue::{CommitQueue, Spawner};
pub use report::CommitReport;
pub use target::CommitTarget;
