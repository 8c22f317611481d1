//! Domain types for the subway arrivals service.
//!
//! Stations, the trains attached to them, and the two small classifiers
//! (line family and travel direction) that the rest of the crate relies on.

mod arrival;
mod direction;
mod error;
mod line_family;
mod station;
mod time;

pub use arrival::{Arrival, FutureStop, Scheduled, Train};
pub use direction::Direction;
pub use error::{DomainError, MalformedTripId};
pub use line_family::LineFamily;
pub use station::{Coordinates, Station, StopRecord};
pub use time::{parse_arrival_time, seconds_until};
