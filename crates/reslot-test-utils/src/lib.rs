//! Test fixtures and payload types for reslot development.
//!
//! Provides payloads that make table behaviour observable from outside:
//! [`DropCounter`] / [`TrackedPayload`] count destructor runs, and
//! [`Entity`] is a small game-style record for realistic scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{DropCounter, Entity, TrackedPayload};
