//! Bounded deferred-request queue with deterministic apply order.
//!
//! [`Spawner`]s may live on any thread. Every submission takes the next
//! sequence number and enqueues its request under one lock shared by all
//! spawners of the queue, so channel order is issue order. A commit drains
//! a prefix of that order: a request issued before another is never
//! applied in a later frame.

use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use reslot_core::{CommitError, SlotError, Ticket};
use reslot_table::Handle;

use crate::error::SpawnError;
use crate::report::CommitReport;
use crate::target::CommitTarget;

/// A deferred request.
enum Request<T> {
    Spawn { ticket: Ticket, value: T },
    Despawn { handle: Handle<T> },
}

/// Owner side of the deferred-request channel.
///
/// Held by the thread that owns the table. Call
/// [`commit`](CommitQueue::commit) once per frame to apply everything
/// submitted since the previous commit.
pub struct CommitQueue<T> {
    tx: Sender<Request<T>>,
    rx: Receiver<Request<T>>,
    next_seq: Arc<Mutex<u64>>,
    capacity: usize,
}

impl<T> CommitQueue<T> {
    /// Default bound on pending requests.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Create a queue holding at most `capacity` pending requests.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "CommitQueue capacity must be at least 1");
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self {
            tx,
            rx,
            next_seq: Arc::new(Mutex::new(0)),
            capacity,
        }
    }

    /// A new submission endpoint for this queue.
    pub fn spawner(&self) -> Spawner<T> {
        Spawner {
            tx: self.tx.clone(),
            next_seq: Arc::clone(&self.next_seq),
            capacity: self.capacity,
        }
    }

    /// Maximum number of pending requests.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Requests submitted but not yet committed.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Apply every pending request to `target`, in issue order.
    ///
    /// Only requests already queued when the call starts are applied;
    /// anything submitted concurrently waits for the next commit. Despawns
    /// of handles that are no longer live are collected in
    /// [`CommitReport::stale`] rather than treated as errors.
    ///
    /// # Panics
    ///
    /// Panics if a despawned handle is out of bounds for `target` or was
    /// issued by a different table.
    pub fn commit<S>(&mut self, target: &mut S) -> CommitReport<T>
    where
        S: CommitTarget<T>,
    {
        let pending = self.rx.len();
        let batch: Vec<Request<T>> = self.rx.try_iter().take(pending).collect();

        let mut report = CommitReport::new();
        for request in batch {
            match request {
                Request::Spawn { ticket, value } => {
                    let handle = target.insert(value);
                    report.spawned.insert(ticket, handle);
                }
                Request::Despawn { handle } => match target.release(handle) {
                    Ok(()) => report.despawned += 1,
                    Err(err @ (SlotError::NotLive { .. } | SlotError::Retired { .. })) => {
                        log::debug!("skipping despawn of {handle}: {err}");
                        report.stale.push(handle);
                    }
                    Err(err) => panic!("invalid despawn of {handle}: {err}"),
                },
            }
        }

        if !report.is_empty() {
            log::debug!(
                "commit applied {} spawns, {} despawns ({} stale)",
                report.spawned.len(),
                report.despawned,
                report.stale.len()
            );
        }
        report
    }
}

impl<T> Default for CommitQueue<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Submission side of a [`CommitQueue`].
///
/// Cheap to clone and `Send` whenever the payload is, so each worker
/// thread can own one.
pub struct Spawner<T> {
    tx: Sender<Request<T>>,
    next_seq: Arc<Mutex<u64>>,
    capacity: usize,
}

impl<T> Spawner<T> {
    /// Stamp and enqueue one request. The sequence number is only consumed
    /// when the send succeeds.
    fn submit(
        &self,
        make: impl FnOnce(u64) -> Request<T>,
    ) -> Result<u64, TrySendError<Request<T>>> {
        let mut next = self.next_seq.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = *next;
        self.tx.try_send(make(seq))?;
        *next += 1;
        Ok(seq)
    }

    /// Queue `value` for creation at the next commit.
    ///
    /// The returned ticket is exchanged for a handle through
    /// [`CommitReport::handle_for`]. On failure the payload comes back
    /// inside the error.
    pub fn spawn(&self, value: T) -> Result<Ticket, SpawnError<T>> {
        match self.submit(|seq| Request::Spawn {
            ticket: Ticket(seq),
            value,
        }) {
            Ok(seq) => Ok(Ticket(seq)),
            Err(TrySendError::Full(request)) => Err(SpawnError {
                error: CommitError::QueueFull {
                    capacity: self.capacity,
                },
                value: into_value(request),
            }),
            Err(TrySendError::Disconnected(request)) => Err(SpawnError {
                error: CommitError::Disconnected,
                value: into_value(request),
            }),
        }
    }

    /// Queue the payload behind `handle` for release at the next commit.
    pub fn despawn(&self, handle: Handle<T>) -> Result<(), CommitError> {
        self.submit(|_| Request::Despawn { handle })
            .map(drop)
            .map_err(|err| match err {
                TrySendError::Full(_) => CommitError::QueueFull {
                    capacity: self.capacity,
                },
                TrySendError::Disconnected(_) => CommitError::Disconnected,
            })
    }
}

fn into_value<T>(request: Request<T>) -> T {
    match request {
        Request::Spawn { value, .. } => value,
        Request::Despawn { .. } => unreachable!("only spawn requests carry a payload"),
    }
}

impl<T> Clone for Spawner<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            next_seq: Arc::clone(&self.next_seq),
            capacity: self.capacity,
        }
    }
}
