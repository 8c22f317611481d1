//! Where the rider is.
//!
//! A resolved location is remembered for a short while so that every
//! refresh does not have to re-read it. The cache is a plain value owned
//! by the caller.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Coordinates;
use crate::nearby::GRAND_CENTRAL;

/// How long a resolved location stays usable, in seconds.
pub const LOCATION_MAX_AGE_SECS: i64 = 15;

/// A location and when it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationCache {
    pub location: Coordinates,
    pub timestamp: DateTime<Utc>,
}

impl LocationCache {
    pub fn new(location: Coordinates, now: DateTime<Utc>) -> Self {
        Self {
            location,
            timestamp: now,
        }
    }

    /// Younger than [`LOCATION_MAX_AGE_SECS`] at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.timestamp < Duration::seconds(LOCATION_MAX_AGE_SECS)
    }

    /// The location, if still fresh.
    pub fn get(&self, now: DateTime<Utc>) -> Option<Coordinates> {
        self.is_fresh(now).then_some(self.location)
    }
}

/// Progress of resolving a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationStatus {
    Acquiring,
    Found(Coordinates),
    NotFound,
}

/// No location could be resolved.
///
/// This is a state to show the rider, not a failure of the program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("location unavailable: {reason}")]
pub struct GeolocationUnavailable {
    pub reason: String,
}

impl GeolocationUnavailable {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Where locations come from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    /// Always the same point
    Fixed(Coordinates),

    /// Grand Central, for showing the app off
    Demo,

    /// A JSON file holding `{ "lat": .., "lng": .. }`, rewritten by
    /// whatever tracks the device
    File(PathBuf),
}

impl LocationSource {
    pub fn is_demo(&self) -> bool {
        matches!(self, LocationSource::Demo)
    }

    fn resolve(&self) -> Result<Coordinates, GeolocationUnavailable> {
        match self {
            LocationSource::Fixed(location) => validate(*location),
            LocationSource::Demo => Ok(GRAND_CENTRAL),
            LocationSource::File(path) => read_location_file(path),
        }
    }
}

fn validate(location: Coordinates) -> Result<Coordinates, GeolocationUnavailable> {
    if (-90.0..=90.0).contains(&location.lat) && (-180.0..=180.0).contains(&location.lng) {
        Ok(location)
    } else {
        Err(GeolocationUnavailable::new(format!(
            "coordinates out of range: {}, {}",
            location.lat, location.lng
        )))
    }
}

fn read_location_file(path: &Path) -> Result<Coordinates, GeolocationUnavailable> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        GeolocationUnavailable::new(format!("failed to read {}: {e}", path.display()))
    })?;
    let location: Coordinates = serde_json::from_str(&json).map_err(|e| {
        GeolocationUnavailable::new(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate(location)
}

/// Resolves locations from a source, through a [`LocationCache`].
#[derive(Debug, Clone)]
pub struct Locator {
    source: LocationSource,
    cache: Option<LocationCache>,
    status: LocationStatus,
}

impl Locator {
    pub fn new(source: LocationSource) -> Self {
        Self {
            source,
            cache: None,
            status: LocationStatus::Acquiring,
        }
    }

    pub fn source(&self) -> &LocationSource {
        &self.source
    }

    pub fn status(&self) -> LocationStatus {
        self.status
    }

    /// The current location, from the cache while it is fresh.
    pub fn locate(&mut self, now: DateTime<Utc>) -> Result<Coordinates, GeolocationUnavailable> {
        if let Some(location) = self.cache.as_ref().and_then(|c| c.get(now)) {
            debug!("using cached location");
            self.status = LocationStatus::Found(location);
            return Ok(location);
        }
        self.refresh(now)
    }

    /// Resolve from the source, ignoring the cache.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<Coordinates, GeolocationUnavailable> {
        self.status = LocationStatus::Acquiring;
        match self.source.resolve() {
            Ok(location) => {
                self.cache = Some(LocationCache::new(location, now));
                self.status = LocationStatus::Found(location);
                Ok(location)
            }
            Err(e) => {
                warn!(error = %e, "could not resolve location");
                self.status = LocationStatus::NotFound;
                Err(e)
            }
        }
    }
}
