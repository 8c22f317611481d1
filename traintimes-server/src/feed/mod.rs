//! Live arrivals feed.
//!
//! Arrivals are read from two interchangeable sources: a primary table and
//! a secondary copy kept up to date by the same ingest job. The
//! [`FetchCoordinator`] queries the primary first and brings the secondary
//! in only when the primary has not answered within the failover window.
//!
//! Key characteristics:
//! - Each source gets its own retry budget (3 attempts, 200 ms apart)
//! - The secondary is started by a timer, never by a primary failure
//! - Whichever source answers successfully first wins the request

mod coordinator;
mod error;
mod file;
mod postgres;
mod source;

pub use coordinator::{FetchCoordinator, FetchPolicy, Fetched, RetryPolicy, SourceRole};
pub use error::{FetchExhausted, NetworkFailure};
pub use file::FileArrivalSource;
pub use postgres::{ArrivalTable, PgArrivalSource, PgSourceConfig};
pub use source::{ArrivalQuery, ArrivalSource, Backend};
