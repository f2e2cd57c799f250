//! Table-specific error types.
//!
//! The error enums live in `reslot-core` so the commit queue can share
//! them; this module re-exports the ones table operations return.

pub use reslot_core::error::{ConfigError, SlotError};
