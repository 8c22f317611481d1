//! Station catalog loaded from disk.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::domain::{Coordinates, Station, StopRecord};
use crate::nearby;

use super::error::StationError;

/// Read-only station dataset.
///
/// Cheap to clone; all clones share the same rows.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    stops: Arc<Vec<StopRecord>>,
    by_id: Arc<HashMap<String, usize>>,
}

impl StationCatalog {
    /// Load the dataset from a JSON array of stop records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let stops: Vec<StopRecord> =
            serde_json::from_str(&contents).map_err(|e| StationError::Json {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if stops.is_empty() {
            return Err(StationError::Empty(path.to_path_buf()));
        }

        Self::from_records(stops)
    }

    /// Build a catalog from rows already in memory.
    pub fn from_records(stops: Vec<StopRecord>) -> Result<Self, StationError> {
        for stop in &stops {
            let valid = (-90.0..=90.0).contains(&stop.stop_lat)
                && (-180.0..=180.0).contains(&stop.stop_lon);
            if !valid {
                return Err(StationError::InvalidCoordinates {
                    stop_id: stop.stop_id.clone(),
                    lat: stop.stop_lat,
                    lon: stop.stop_lon,
                });
            }
        }

        let by_id = stops
            .iter()
            .enumerate()
            .map(|(i, s)| (s.stop_id.clone(), i))
            .collect();

        Ok(Self {
            stops: Arc::new(stops),
            by_id: Arc::new(by_id),
        })
    }

    pub fn get(&self, stop_id: &str) -> Option<&StopRecord> {
        self.by_id.get(stop_id).map(|&i| &self.stops[i])
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Stations within `max_distance_miles` of `location`, nearest first.
    pub fn find_closest_stations(
        &self,
        location: Coordinates,
        max_distance_miles: f64,
    ) -> Vec<Station> {
        nearby::find_closest_stations(&self.stops, location, max_distance_miles)
    }
}
