//! Polling client for the arrival board.
//!
//! The pieces a board display needs: where the rider is, a countdown to the
//! next refresh, and an HTTP client that fetches and re-labels schedules.

mod countdown;
mod http;
mod location;

pub use countdown::{Countdown, REFRESH_SECS};
pub use http::{ClientConfig, ClientError, TrainTimesClient};
pub use location::{
    GeolocationUnavailable, LOCATION_MAX_AGE_SECS, LocationCache, LocationSource, LocationStatus,
    Locator,
};
