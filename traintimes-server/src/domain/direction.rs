//! Travel direction, as encoded in GTFS-Realtime trip identifiers.
//!
//! NYC trip ids look like `131000_1..S03R` or `045600_GS.N04R`: an origin
//! time, an underscore, the route, one or two dots, then the direction
//! letter followed by a shape suffix. The grammar below is what the
//! published feed produces today; anything it does not recognise is
//! reported as [`MalformedTripId`] and left out of both buckets.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::MalformedTripId;

/// Direction of travel through a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
}

impl Direction {
    /// Extract the direction from a trip identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use traintimes_server::domain::Direction;
    ///
    /// assert_eq!(Direction::from_trip_id("A20_1..N"), Ok(Direction::North));
    /// assert_eq!(Direction::from_trip_id("045600_GS.S04R"), Ok(Direction::South));
    /// assert!(Direction::from_trip_id("no-direction").is_err());
    /// ```
    pub fn from_trip_id(trip_id: &str) -> Result<Self, MalformedTripId> {
        let malformed = |reason| MalformedTripId {
            trip_id: trip_id.to_string(),
            reason,
        };

        let path = trip_id
            .split('_')
            .nth(1)
            .ok_or_else(|| malformed("missing '_' segment"))?;

        let pieces: Vec<&str> = path.split("..").collect();
        let marker = if pieces.len() == 1 {
            path.split('.')
                .nth(1)
                .ok_or_else(|| malformed("missing '.' delimiter"))?
                .chars()
                .next()
        } else {
            pieces[1].chars().next()
        };

        match marker {
            Some('N') => Ok(Direction::North),
            Some('S') => Ok(Direction::South),
            Some(_) => Err(malformed("direction letter is not N or S")),
            None => Err(malformed("empty direction segment")),
        }
    }

    /// The single-letter code used on the wire.
    pub fn code(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::South => "S",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
