//! Feed error types.

use std::time::Duration;

/// A single failed attempt against one source.
///
/// Always retryable; the coordinator decides when to stop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkFailure {
    /// Query or connection failed
    #[error("database error: {0}")]
    Database(String),

    /// Attempt did not finish in time
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Source could not serve the query at all
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The task running the retry loop panicked or was cancelled
    #[error("fetch task ended abnormally: {0}")]
    Task(String),
}

impl From<sqlx::Error> for NetworkFailure {
    fn from(err: sqlx::Error) -> Self {
        NetworkFailure::Database(err.to_string())
    }
}

impl From<tokio::task::JoinError> for NetworkFailure {
    fn from(err: tokio::task::JoinError) -> Self {
        NetworkFailure::Task(err.to_string())
    }
}

/// Both sources used up their retry budgets.
///
/// Carries the last failure from each side. This is the only feed error
/// callers ever see.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("both arrival sources failed (primary: {primary}; secondary: {secondary})")]
pub struct FetchExhausted {
    pub primary: NetworkFailure,
    pub secondary: NetworkFailure,
}
