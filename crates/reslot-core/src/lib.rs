//! Core identifiers and error types for the reslot allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! strongly-typed ids shared by the slot table and the commit queue, and
//! the error types they report.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;

pub use error::{CommitError, ConfigError, SlotError};
pub use id::{Generation, SlotIndex, Ticket};
