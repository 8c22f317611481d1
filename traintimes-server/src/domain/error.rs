//! Domain error types.
//!
//! These errors describe feed data the domain layer cannot interpret.
//! None of them are fatal to a request: callers drop or exclude the
//! offending row and carry on.

/// A trip identifier whose direction could not be determined.
///
/// Rows with such an id are left out of both directional buckets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot determine direction from trip id {trip_id:?}: {reason}")]
pub struct MalformedTripId {
    pub trip_id: String,
    pub reason: &'static str,
}

/// Domain-level errors for feed rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Arrival timestamp in a format we do not understand
    #[error("invalid arrival time {0:?}")]
    InvalidTimestamp(String),

    /// Naive Eastern time that does not exist (spring-forward gap)
    #[error("arrival time {0:?} does not exist in America/New_York")]
    NonexistentLocalTime(String),
}
