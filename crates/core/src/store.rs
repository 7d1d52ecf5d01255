//! Errors raised by persistence collaborators.

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

/// Current time at the precision stores keep (microseconds), so a record
/// returned from a write equals the record read back later.
#[must_use]
pub fn store_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Failure reported by a loan or account store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {0}")]
    Conflict(String),

    /// The store call did not finish in time; it may or may not have applied.
    #[error("{operation} timed out; outcome is indeterminate")]
    Timeout {
        /// Store operation that timed out.
        operation: &'static str,
    },

    /// The backing store failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
