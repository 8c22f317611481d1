//! Joining feed rows to stations.

use tracing::debug;

use crate::domain::{Arrival, Direction, Station, Train};

/// Attach north- and southbound trains to each station.
///
/// A row belongs to a station when its `stop_id` matches; its bucket comes
/// from the trip id. Rows whose direction cannot be read are left out. A
/// station with an empty headsign for a direction always gets an empty list
/// for that direction. The inputs are not modified.
pub fn build_train_data(trains: &[Arrival], stations: &[Station]) -> Vec<Station> {
    stations
        .iter()
        .map(|station| {
            let mut north = Vec::new();
            let mut south = Vec::new();

            for row in trains.iter().filter(|t| t.stop_id == station.stop_id) {
                match Direction::from_trip_id(&row.trip_id) {
                    Ok(Direction::North) => north.push(Train::from(row)),
                    Ok(Direction::South) => south.push(Train::from(row)),
                    Err(e) => debug!(error = %e, stop_id = %row.stop_id, "excluding arrival"),
                }
            }

            if !station.serves(Direction::North) {
                north.clear();
            }
            if !station.serves(Direction::South) {
                south.clear();
            }

            Station {
                n_trains: Some(north),
                s_trains: Some(south),
                ..station.clone()
            }
        })
        .collect()
}
