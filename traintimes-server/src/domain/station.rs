//! Stations and static stop records.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use super::arrival::Train;
use super::direction::Direction;
use super::line_family::LineFamily;

/// A point on the map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub lat: f64,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Accepts `40.75` as well as `"40.75"`.
///
/// The station dataset stores coordinates as strings, and browser clients
/// echo them back unparsed.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(&s), &"a number")),
    }
}

/// One row of the static station dataset.
///
/// Field names follow the GTFS `stops.txt` columns the dataset was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub stop_lat: f64,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub stop_lon: f64,
    /// Empty when no northbound service stops here
    #[serde(default)]
    pub n_headsign: String,
    /// Empty when no southbound service stops here
    #[serde(default)]
    pub s_headsign: String,
}

impl StopRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.stop_lat, self.stop_lon)
    }
}

/// A platform near the user, with its trains once they are loaded.
///
/// The train slots distinguish three states: `None` means not loaded yet,
/// an empty list means loaded with no trains, and a populated list is the
/// normalised schedule. A failed fetch never produces either of the last two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "stopId")]
    pub stop_id: String,

    #[serde(rename = "stopName")]
    pub stop_name: String,

    pub n_headsign: String,

    pub s_headsign: String,

    pub coordinates: Coordinates,

    /// Distance from the user in miles
    #[serde(default)]
    pub distance: f64,

    #[serde(default)]
    pub n_trains: Option<Vec<Train>>,

    #[serde(default)]
    pub s_trains: Option<Vec<Train>>,
}

impl Station {
    /// Build an unloaded station from a dataset row.
    pub fn from_record(record: &StopRecord, distance: f64) -> Self {
        Self {
            stop_id: record.stop_id.clone(),
            stop_name: record.stop_name.clone(),
            n_headsign: record.n_headsign.clone(),
            s_headsign: record.s_headsign.clone(),
            coordinates: record.coordinates(),
            distance,
            n_trains: None,
            s_trains: None,
        }
    }

    pub fn line_family(&self) -> LineFamily {
        LineFamily::of_stop(&self.stop_id)
    }

    /// Whether any train runs in `direction` from this platform.
    pub fn serves(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => !self.n_headsign.is_empty(),
            Direction::South => !self.s_headsign.is_empty(),
        }
    }

    pub fn headsign(&self, direction: Direction) -> &str {
        match direction {
            Direction::North => &self.n_headsign,
            Direction::South => &self.s_headsign,
        }
    }

    pub fn trains(&self, direction: Direction) -> Option<&[Train]> {
        match direction {
            Direction::North => self.n_trains.as_deref(),
            Direction::South => self.s_trains.as_deref(),
        }
    }
}
