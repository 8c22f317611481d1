//! Static station dataset.
//!
//! Stop id → name, headsigns and coordinates. Loaded once at startup from a
//! JSON file and shared read-only for the life of the process.

mod catalog;
mod error;

pub use catalog::StationCatalog;
pub use error::StationError;
