//! Benchmark workload profiles for the reslot allocator.
//!
//! Provides deterministic operation streams for benchmarking and examples:
//!
//! - [`churn_schedule`]: steady-state allocate/free mix around a target
//!   population, seeded so runs are reproducible.
//! - [`run_schedule`]: replays a schedule against a [`SlotTable`].
//! - [`generation_spread`]: how evenly reuse is spread across slots.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reslot_table::{Handle, SlotTable};

/// One step of a churn workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChurnOp {
    /// Allocate a payload with this value.
    Allocate(u64),
    /// Free the live handle at this position in the live list
    /// (modulo its length).
    Free(usize),
    /// Read the live handle at this position in the live list
    /// (modulo its length).
    Read(usize),
}

/// Build a reproducible stream of `ops` operations that keeps roughly
/// `population` payloads live.
///
/// Below the target population allocations are three times as likely as
/// frees, above it the ratio flips. Half of all operations are reads.
pub fn churn_schedule(seed: u64, population: usize, ops: usize) -> Vec<ChurnOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut live = 0usize;
    let mut schedule = Vec::with_capacity(ops);
    for _ in 0..ops {
        let roll = rng.next_u32() % 8;
        let pick = rng.next_u32() as usize;
        let op = if roll < 4 && live > 0 {
            ChurnOp::Read(pick)
        } else {
            let allocate_bias = if live < population { 3 } else { 1 };
            if live == 0 || rng.next_u32() % 4 < allocate_bias {
                live += 1;
                ChurnOp::Allocate(rng.next_u64())
            } else {
                live -= 1;
                ChurnOp::Free(pick)
            }
        };
        schedule.push(op);
    }
    schedule
}

/// Replay `schedule` against `table`, returning the handles still live
/// at the end and the sum of every value read.
pub fn run_schedule(table: &mut SlotTable<u64>, schedule: &[ChurnOp]) -> (Vec<Handle<u64>>, u64) {
    let mut live: Vec<Handle<u64>> = Vec::new();
    let mut checksum = 0u64;
    for op in schedule {
        match *op {
            ChurnOp::Allocate(v) => live.push(table.allocate(v)),
            ChurnOp::Free(i) => {
                let h = live.swap_remove(i % live.len());
                table.free(h);
            }
            ChurnOp::Read(i) => {
                let h = live[i % live.len()];
                checksum = checksum.wrapping_add(table.get(h).copied().unwrap_or(0));
            }
        }
    }
    (live, checksum)
}

/// Lowest and highest generation across all slots currently holding a
/// payload, or `(0, 0)` for an empty table.
pub fn generation_spread<T>(table: &SlotTable<T>) -> (u32, u32) {
    let mut min = u32::MAX;
    let mut max = 0;
    for i in 0..table.slot_count() {
        let index = reslot_core::SlotIndex(i as u32);
        let generation = match table.handle_at(index) {
            Some(h) => h.generation().0,
            None => continue,
        };
        min = min.min(generation);
        max = max.max(generation);
    }
    if min > max {
        (0, 0)
    } else {
        (min, max)
    }
}
