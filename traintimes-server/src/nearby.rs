//! Nearest-station search.
//!
//! Great-circle distance from the user to every stop in the dataset, a
//! radius cut, and a distance adjustment so that one physical station
//! served by several platforms of the same line family shows up at one
//! distance rather than several.

use std::collections::HashMap;

use crate::domain::{Coordinates, LineFamily, Station, StopRecord};

/// Mean Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Radius used when the caller does not ask for one.
pub const DEFAULT_RADIUS_MILES: f64 = 0.5;

/// Fixed location for demo mode: Grand Central Terminal.
pub const GRAND_CENTRAL: Coordinates = Coordinates {
    lat: 40.7527,
    lng: -73.9772,
};

/// Radius used in demo mode.
pub const DEMO_RADIUS_MILES: f64 = 0.25;

/// Haversine distance between two points, in miles.
///
/// # Examples
///
/// ```
/// use traintimes_server::domain::Coordinates;
/// use traintimes_server::nearby::haversine_distance;
///
/// let gct = Coordinates::new(40.7527, -73.9772);
/// assert_eq!(haversine_distance(gct, gct), 0.0);
/// ```
pub fn haversine_distance(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// All stops within `max_distance_miles` of `location`, nearest first.
///
/// Returned stations have both train slots unloaded.
pub fn find_closest_stations(
    stops: &[StopRecord],
    location: Coordinates,
    max_distance_miles: f64,
) -> Vec<Station> {
    let mut stations: Vec<Station> = stops
        .iter()
        .filter_map(|stop| {
            let distance = haversine_distance(location, stop.coordinates());
            (distance <= max_distance_miles).then(|| Station::from_record(stop, distance))
        })
        .collect();

    stations.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    stations
}

/// Give every stop the minimum distance of its `(stop name, line family)` group.
fn adjust_distances(stops: &mut [Station]) {
    let mut group_min: HashMap<(String, LineFamily), f64> = HashMap::new();

    for stop in stops.iter() {
        group_min
            .entry((stop.stop_name.clone(), stop.line_family()))
            .and_modify(|d| *d = d.min(stop.distance))
            .or_insert(stop.distance);
    }

    for stop in stops.iter_mut() {
        if let Some(&d) = group_min.get(&(stop.stop_name.clone(), stop.line_family())) {
            stop.distance = d;
        }
    }
}

/// Adjust distances per station group, then sort ascending.
///
/// The sort is stable, so platforms of one group keep their relative order.
pub fn sort_subway_stops(mut stops: Vec<Station>) -> Vec<Station> {
    adjust_distances(&mut stops);
    stops.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    stops
}

/// Keep only stops in the family named `selected_family`.
///
/// An empty name selects everything.
pub fn filter_stops(stops: Vec<Station>, selected_family: &str) -> Vec<Station> {
    if selected_family.is_empty() {
        return stops;
    }
    stops
        .into_iter()
        .filter(|s| s.line_family().name() == selected_family)
        .collect()
}
