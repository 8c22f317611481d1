//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::domain::{Coordinates, FutureStop, LineFamily, Station};
use crate::feed::FetchExhausted;
use crate::nearby::{
    DEFAULT_RADIUS_MILES, DEMO_RADIUS_MILES, GRAND_CENTRAL, filter_stops, sort_subway_stops,
};
use crate::schedule::{process_future_stops, station_boards};

use super::dto::*;
use super::state::AppState;

/// Shown for stops missing from the station catalog.
const UNKNOWN_STOP_NAME: &str = "Unknown Stop";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // Only the trip endpoint is served cross-origin.
    let cors = CorsLayer::new().allow_origin(Any).allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]);

    Router::new()
        .route("/health", get(health))
        .route("/api", post(station_board))
        .route("/api/futureStops", post(future_stops).layer(cors))
        .route("/api/stations/nearby", get(nearby_stations))
        .route("/api/families", get(families))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Fill in the trains of the first station in the request.
///
/// Arrivals are fetched for every station in the request, but only the
/// first is returned; clients send one station per call.
async fn station_board(
    State(state): State<AppState>,
    Json(req): Json<StationsRequest>,
) -> Result<Json<Station>, AppError> {
    let stop_ids: Vec<String> = req.stops.iter().map(|s| s.stop_id.clone()).collect();
    if stop_ids.is_empty() {
        return Err(AppError::BadRequest {
            message: "stops must not be empty".into(),
        });
    }

    let fetched = state.feed.fetch_arrivals(&stop_ids).await?;
    info!(
        source = %fetched.source,
        rows = fetched.rows.len(),
        stops = stop_ids.len(),
        "station board fetched"
    );

    station_boards(&fetched.rows, &req.stops, Utc::now())
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::Internal {
            message: "no station assembled".into(),
        })
}

/// Every later stop of one trip, soonest first.
async fn future_stops(
    State(state): State<AppState>,
    Json(req): Json<FutureStopsRequest>,
) -> Result<Json<Vec<FutureStop>>, AppError> {
    if req.route_id.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "routeId must not be empty".into(),
        });
    }

    let fetched = state.feed.fetch_trip(&req.route_id).await?;
    let stops = fetched
        .rows
        .iter()
        .cloned()
        .map(|row| {
            let mut stop = FutureStop::from(row);
            stop.stop_name = state
                .catalog
                .get(&stop.stop_id)
                .map_or(UNKNOWN_STOP_NAME, |record| record.stop_name.as_str())
                .to_string();
            stop
        })
        .collect();

    Ok(Json(process_future_stops(stops, Utc::now())))
}

/// Stations near a point, grouped and sorted, optionally for one family.
///
/// The returned stations have no trains loaded.
async fn nearby_stations(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<NearbyResponse>, AppError> {
    let (location, default_radius) = if query.demo {
        (GRAND_CENTRAL, DEMO_RADIUS_MILES)
    } else {
        match (query.lat, query.lng) {
            (Some(lat), Some(lng)) => (Coordinates::new(lat, lng), DEFAULT_RADIUS_MILES),
            _ => {
                return Err(AppError::BadRequest {
                    message: "lat and lng are required unless demo is set".into(),
                });
            }
        }
    };

    if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lng) {
        return Err(AppError::BadRequest {
            message: format!("invalid location: {}, {}", location.lat, location.lng),
        });
    }

    let radius = query.radius.unwrap_or(default_radius);
    if !radius.is_finite() || radius <= 0.0 {
        return Err(AppError::BadRequest {
            message: format!("invalid radius: {radius}"),
        });
    }

    let family = query.family.unwrap_or_default();
    if !family.is_empty() && LineFamily::from_name(&family).is_none() {
        return Err(AppError::BadRequest {
            message: format!("unknown line family: {family}"),
        });
    }

    let found = state.catalog.find_closest_stations(location, radius);
    let stations = filter_stops(sort_subway_stops(found), &family);

    Ok(Json(NearbyResponse {
        location: LocationResult {
            lat: location.lat,
            lng: location.lng,
            demo: query.demo,
        },
        radius,
        stations,
    }))
}

/// Line families in menu order.
async fn families() -> Json<Vec<FamilyResult>> {
    Json(LineFamily::ALL.into_iter().map(FamilyResult::from).collect())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    FetchFailed(FetchExhausted),
    Internal { message: String },
}

impl From<FetchExhausted> for AppError {
    fn from(e: FetchExhausted) -> Self {
        AppError::FetchFailed(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: message,
                        details: None,
                    },
                )
            }
            AppError::FetchFailed(e) => {
                error!(error = %e, "arrival fetch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Failed to fetch train data".into(),
                        details: Some(serde_json::json!({
                            "primary": e.primary.to_string(),
                            "secondary": e.secondary.to_string(),
                        })),
                    },
                )
            }
            AppError::Internal { message } => {
                error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: message,
                        details: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
