//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{LineFamily, Station};

/// Body of `POST /api`.
#[derive(Debug, Deserialize)]
pub struct StationsRequest {
    /// Stations to fill in. Only the first is returned.
    pub stops: Vec<Station>,
}

/// Body of `POST /api/futureStops`.
#[derive(Debug, Deserialize)]
pub struct FutureStopsRequest {
    /// Trip id to follow. Named `routeId` on the wire.
    #[serde(rename = "routeId")]
    pub route_id: String,
}

/// Query of `GET /api/stations/nearby`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,

    /// Search radius in miles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,

    /// Line family name, e.g. "Broadway". Empty or absent means all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Use the fixed demo location instead of `lat`/`lng`
    #[serde(default)]
    pub demo: bool,
}

/// Response of `GET /api/stations/nearby`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub location: LocationResult,
    pub radius: f64,
    pub stations: Vec<Station>,
}

/// The location a nearby search was run from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub lat: f64,
    pub lng: f64,
    pub demo: bool,
}

/// One line family and the routes it carries.
#[derive(Debug, Serialize)]
pub struct FamilyResult {
    pub name: &'static str,
    pub routes: &'static [&'static str],
}

impl From<LineFamily> for FamilyResult {
    fn from(family: LineFamily) -> Self {
        Self {
            name: family.name(),
            routes: family.routes(),
        }
    }
}

/// Error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Underlying cause, when there is one worth showing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
