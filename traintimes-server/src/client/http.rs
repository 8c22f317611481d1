//! HTTP client for the arrival board server.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::domain::{FutureStop, Station};
use crate::schedule::{fix_arrival_time, process_future_stops};
use crate::web::{NearbyQuery, NearbyResponse};

/// Default server address.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Errors from the board client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Request failed (connection, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server error {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not parse
    #[error("JSON parse error: {message} (body: {body})")]
    Json { message: String, body: String },
}

/// Configuration for the board client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, without a trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the arrival board endpoints.
///
/// Schedules are normalised again on receipt, so countdowns are measured
/// from the client's clock rather than the server's.
#[derive(Debug, Clone)]
pub struct TrainTimesClient {
    http: reqwest::Client,
    base_url: String,
}

impl TrainTimesClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stations near a location, without trains.
    pub async fn nearby_stations(
        &self,
        query: &NearbyQuery,
    ) -> Result<NearbyResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/stations/nearby", self.base_url))
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }

    /// One station with its trains loaded and labelled as of `now`.
    pub async fn station_board(
        &self,
        station: &Station,
        now: DateTime<Utc>,
    ) -> Result<Station, ClientError> {
        let response = self
            .http
            .post(format!("{}/api", self.base_url))
            .json(&json!({ "stops": [station] }))
            .send()
            .await?;
        let mut board: Station = read_json(response).await?;
        fix_arrival_time(&mut board, now);
        Ok(board)
    }

    /// Like [`station_board`](Self::station_board), but a failure gives back
    /// the station as it was, trains still unknown.
    pub async fn station_board_or_unloaded(
        &self,
        station: &Station,
        now: DateTime<Utc>,
    ) -> Station {
        match self.station_board(station, now).await {
            Ok(board) => board,
            Err(e) => {
                warn!(stop_id = %station.stop_id, error = %e, "failed to fetch station board");
                station.clone()
            }
        }
    }

    /// Later stops of a trip, labelled as of `now`.
    pub async fn future_stops(
        &self,
        trip_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<FutureStop>, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/futureStops", self.base_url))
            .json(&json!({ "routeId": trip_id }))
            .send()
            .await?;
        let stops: Vec<FutureStop> = read_json(response).await?;
        Ok(process_future_stops(stops, now))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Json {
        message: e.to_string(),
        body: body.chars().take(500).collect(),
    })
}
