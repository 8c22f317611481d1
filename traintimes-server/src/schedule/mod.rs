//! Turning feed rows into per-station schedules.
//!
//! [`build_train_data`] joins rows to stations by stop id and direction;
//! [`process_trains`] then drops stale rows, sorts by imminence and writes
//! the countdown labels shown to riders.

mod assemble;
mod normalize;

pub use assemble::build_train_data;
pub use normalize::{
    STALE_AFTER_SECS, countdown_label, fix_arrival_time, process_future_stops, process_trains,
};

use chrono::{DateTime, Utc};

use crate::domain::{Arrival, Station};

/// Assemble and normalise in one pass.
pub fn station_boards(rows: &[Arrival], stations: &[Station], now: DateTime<Utc>) -> Vec<Station> {
    let mut boards = build_train_data(rows, stations);
    for station in &mut boards {
        fix_arrival_time(station, now);
    }
    boards
}
