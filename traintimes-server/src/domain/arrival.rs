//! Arrival rows and their normalised forms.

use serde::{Deserialize, Serialize};

/// A raw row from the arrivals feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Arrival {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_id: Option<i64>,

    /// Line code, e.g. "6" or "Q"
    pub route_id: String,

    /// GTFS-Realtime trip id; encodes the direction
    pub trip_id: String,

    pub stop_id: String,

    /// Scheduled arrival, as written by the feed
    pub arrival_time: String,

    pub destination: String,
}

/// A train listed under a station's north or south slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub route_id: String,
    pub trip_id: String,
    pub stop_id: String,

    /// Raw feed timestamp, kept so normalisation can be repeated later
    pub arrival_time: String,

    pub destination: String,

    #[serde(
        rename = "timeDiffInSeconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub time_diff_in_seconds: Option<i64>,

    /// "arriving", "1 minute", "7 minutes"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl From<&Arrival> for Train {
    fn from(row: &Arrival) -> Self {
        Self {
            route_id: row.route_id.clone(),
            trip_id: row.trip_id.clone(),
            stop_id: row.stop_id.clone(),
            arrival_time: row.arrival_time.clone(),
            destination: row.destination.clone(),
            time_diff_in_seconds: None,
            display: None,
        }
    }
}

/// A later stop on a trip the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureStop {
    #[serde(default)]
    pub arrival_id: i64,
    pub arrival_time: String,
    pub destination: String,
    pub route_id: String,
    pub stop_id: String,
    /// Station name for `stop_id`, filled in by the server
    #[serde(default)]
    pub stop_name: String,
    #[serde(rename = "timeDiffInSeconds", default)]
    pub time_diff_in_seconds: i64,
    pub trip_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl From<Arrival> for FutureStop {
    fn from(row: Arrival) -> Self {
        Self {
            arrival_id: row.arrival_id.unwrap_or_default(),
            arrival_time: row.arrival_time,
            destination: row.destination,
            route_id: row.route_id,
            stop_id: row.stop_id,
            stop_name: String::new(),
            time_diff_in_seconds: 0,
            trip_id: row.trip_id,
            display: None,
        }
    }
}

/// Anything with an arrival timestamp that can carry a countdown label.
pub trait Scheduled {
    fn arrival_time(&self) -> &str;

    fn set_countdown(&mut self, seconds: i64, display: String);
}

impl Scheduled for Train {
    fn arrival_time(&self) -> &str {
        &self.arrival_time
    }

    fn set_countdown(&mut self, seconds: i64, display: String) {
        self.time_diff_in_seconds = Some(seconds);
        self.display = Some(display);
    }
}

impl Scheduled for FutureStop {
    fn arrival_time(&self) -> &str {
        &self.arrival_time
    }

    fn set_countdown(&mut self, seconds: i64, display: String) {
        self.time_diff_in_seconds = seconds;
        self.display = Some(display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Arrival {
        Arrival {
            arrival_id: Some(42),
            route_id: "6".into(),
            trip_id: "131000_6..S03R".into(),
            stop_id: "631".into(),
            arrival_time: "2024-06-01T12:05:00".into(),
            destination: "Brooklyn Bridge-City Hall".into(),
        }
    }

    #[test]
    fn train_from_row_drops_id() {
        let train = Train::from(&row());
        assert_eq!(train.stop_id, "631");
        assert!(train.time_diff_in_seconds.is_none());

        let json = serde_json::to_value(&train).unwrap();
        assert!(json.get("arrival_id").is_none());
        assert!(json.get("timeDiffInSeconds").is_none());
    }

    #[test]
    fn future_stop_from_row_keeps_id() {
        let stop = FutureStop::from(row());
        assert_eq!(stop.arrival_id, 42);
        assert_eq!(stop.trip_id, "131000_6..S03R");
    }

    #[test]
    fn set_countdown_fills_display() {
        let mut train = Train::from(&row());
        train.set_countdown(125, "2 minutes".into());

        let json = serde_json::to_value(&train).unwrap();
        assert_eq!(json["timeDiffInSeconds"], 125);
        assert_eq!(json["display"], "2 minutes");
        assert_eq!(json["arrival_time"], "2024-06-01T12:05:00");
    }

    #[test]
    fn row_without_id_deserializes() {
        let json = r#"{
            "route_id": "Q",
            "trip_id": "084150_Q..N58R",
            "stop_id": "R16",
            "arrival_time": "2024-06-01T12:05:00",
            "destination": "96 St"
        }"#;
        let row: Arrival = serde_json::from_str(json).unwrap();
        assert_eq!(row.arrival_id, None);
    }
}
