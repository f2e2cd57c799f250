//! Commit-queue error types.

use std::error::Error;
use std::fmt;

pub use reslot_core::error::CommitError;

/// A spawn request that could not be queued.
///
/// Carries the payload back to the caller so it is never dropped on the
/// floor; the caller decides whether to retry next frame or discard it.
pub struct SpawnError<T> {
    /// Why the request was rejected.
    pub error: CommitError,
    /// The payload that was not queued.
    pub value: T,
}

impl<T> SpawnError<T> {
    /// Recover the rejected payload.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for SpawnError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for SpawnError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spawn rejected: {}", self.error)
    }
}

impl<T> Error for SpawnError<T> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
