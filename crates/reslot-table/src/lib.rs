//! Generational slot tables for long-lived entity handles.
//!
//! A slot table stores payloads in reusable slots, each tagged with a
//! generation counter. Callers hold small `Copy` handles instead of
//! references; a handle records the generation it was issued for, so once
//! its slot is freed (and perhaps reused) the handle reads as stale instead
//! of silently aliasing the new occupant.
//!
//! # Tiers
//!
//! ```text
//! SlotTable<T>            index tier: Handle<T> = (index, generation)
//! ├── Vec<Slot<T>>        occupied | vacant | retired, plus generation
//! └── FreeQueue           FIFO of vacant indices
//!
//! DirectTable<T>          direct tier: DirectHandle<'t, T> = (&slot, generation)
//! ├── StableSlots<T>      append-only Vec<Box<DirectSlot<T>>>
//! └── RefCell<FreeQueue>
//! ```
//!
//! - **Index tier:** every access goes through the table and returns
//!   `Option`. Handles are `Send + Sync` and can be stored anywhere.
//! - **Direct tier:** handles dereference on their own through a per-slot
//!   `RefCell`. The handle borrows the table, so the table cannot be
//!   dropped while handles exist.
//!
//! # Error policy
//!
//! Stale lookups are ordinary control flow and return `None`. Freeing a
//! handle that is not live is a programming error: `free` panics, and
//! `try_free` reports the [`SlotError`] for callers that want to classify
//! it.
//!
//! # Safety
//!
//! `unsafe` is confined to `raw.rs`, which hands out references into the
//! boxed slots of the direct tier.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod direct;
pub mod error;
pub mod free_queue;
pub mod handle;
mod raw;
mod slot;
pub mod stats;
pub mod table;

// Public re-exports for the primary API surface.
pub use config::{GenerationPolicy, TableConfig};
pub use direct::{DirectHandle, DirectTable};
pub use error::{ConfigError, SlotError};
pub use handle::Handle;
pub use stats::TableStats;
pub use table::SlotTable;
