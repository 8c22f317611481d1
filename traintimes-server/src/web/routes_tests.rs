use super::*;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, header};
use chrono::Duration as ChronoDuration;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::cache::{CacheConfig, CachedFeed};
use crate::domain::Arrival;
use crate::feed::{
    ArrivalTable, Backend, FetchCoordinator, FetchPolicy, FileArrivalSource, PgArrivalSource,
    PgSourceConfig, RetryPolicy,
};
use crate::stations::StationCatalog;

fn row(stop_id: &str, trip_id: &str, in_seconds: i64) -> Arrival {
    Arrival {
        arrival_id: Some(in_seconds),
        route_id: "6".into(),
        trip_id: trip_id.into(),
        stop_id: stop_id.into(),
        arrival_time: (Utc::now() + ChronoDuration::seconds(in_seconds)).to_rfc3339(),
        destination: "Pelham Bay Park".into(),
    }
}

fn fast_policy() -> FetchPolicy {
    FetchPolicy::default()
        .with_failover_after(Duration::from_millis(10))
        .with_retry(
            RetryPolicy::default()
                .with_attempts(1)
                .with_delay(Duration::from_millis(1)),
        )
}

fn app_with(primary: Backend, secondary: Backend) -> Router {
    let coordinator = FetchCoordinator::new(primary, secondary, fast_policy());
    let feed = CachedFeed::new(coordinator, &CacheConfig::default());
    let catalog = StationCatalog::load("data/stations.json").unwrap();
    create_router(AppState::new(feed, catalog))
}

fn app(rows: Vec<Arrival>) -> Router {
    let source = FileArrivalSource::from_rows(rows);
    app_with(Backend::File(source.clone()), Backend::File(source))
}

/// Both sources point at a port nothing listens on.
fn unreachable_app() -> Router {
    let config = PgSourceConfig::default().with_acquire_timeout(Duration::from_millis(100));
    let url = "postgres://nobody@127.0.0.1:1/none";
    let primary = PgArrivalSource::connect_lazy(url, ArrivalTable::Primary, &config).unwrap();
    let secondary = PgArrivalSource::connect_lazy(url, ArrivalTable::Secondary, &config).unwrap();
    app_with(Backend::Postgres(primary), Backend::Postgres(secondary))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "https://example.org")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn grand_central() -> Value {
    json!({
        "stopId": "631",
        "stopName": "Grand Central-42 St",
        "n_headsign": "Uptown & The Bronx",
        "s_headsign": "Downtown & Brooklyn",
        "coordinates": { "lat": 40.751776, "lng": -73.976848 },
        "distance": 0.03,
        "n_trains": null,
        "s_trains": null
    })
}

#[tokio::test]
async fn health_check() {
    let response = app(vec![]).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn station_board_splits_and_labels_trains() {
    let app = app(vec![
        row("631", "131000_6..N03R", 330),
        row("631", "131200_4..N03R", -100),
        row("631", "131000_6..S03R", 20),
        row("R16", "131000_Q..N03R", 60),
    ]);

    let (status, _, body) =
        send(app, post_json("/api", json!({ "stops": [grand_central()] }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stopId"], "631");

    let north = body["n_trains"].as_array().unwrap();
    assert_eq!(north.len(), 1);
    assert_eq!(north[0]["trip_id"], "131000_6..N03R");
    assert_eq!(north[0]["display"], "5 minutes");

    let south = body["s_trains"].as_array().unwrap();
    assert_eq!(south.len(), 1);
    assert_eq!(south[0]["display"], "arriving");
}

#[tokio::test]
async fn station_board_with_no_rows_is_loaded_but_empty() {
    let (status, _, body) =
        send(app(vec![]), post_json("/api", json!({ "stops": [grand_central()] }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["n_trains"], json!([]));
    assert_eq!(body["s_trains"], json!([]));
}

#[tokio::test]
async fn empty_stops_is_rejected() {
    let (status, _, body) = send(app(vec![]), post_json("/api", json!({ "stops": [] }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "stops must not be empty");
}

#[tokio::test]
async fn exhausted_sources_report_failure() {
    let (status, _, body) =
        send(unreachable_app(), post_json("/api", json!({ "stops": [grand_central()] }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch train data");
    assert!(body["details"]["primary"].is_string());
    assert!(body["details"]["secondary"].is_string());
}

#[tokio::test]
async fn future_stops_are_ordered_and_open_to_other_origins() {
    let trip = "131000_6..N03R";
    let app = app(vec![
        row("629", trip, 400),
        row("631", trip, -100),
        row("630", trip, 150),
        row("Z99", trip, 700),
        row("631", "other_6..N03R", 60),
    ]);

    let (status, headers, body) =
        send(app, post_json("/api/futureStops", json!({ "routeId": trip }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let stops: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stop_id"].as_str().unwrap())
        .collect();
    assert_eq!(stops, ["630", "629", "Z99"]);
    assert_eq!(body[0]["arrival_id"], 150);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stop_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["51 St", "59 St", "Unknown Stop"]);
}

#[tokio::test]
async fn future_stops_preflight() {
    let request = Request::options("/api/futureStops")
        .header(header::ORIGIN, "https://example.org")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(app(vec![]), request).await;

    assert_eq!(status, StatusCode::OK);
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("DELETE"));
}

#[tokio::test]
async fn station_board_is_not_cross_origin() {
    let (_, headers, _) =
        send(app(vec![]), post_json("/api", json!({ "stops": [grand_central()] }))).await;
    assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn nearby_demo_uses_grand_central() {
    let (status, _, body) = send(app(vec![]), get("/api/stations/nearby?demo=true")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["demo"], true);
    assert_eq!(body["radius"], 0.25);

    let stations = body["stations"].as_array().unwrap();
    let mut ids: Vec<&str> = stations.iter().map(|s| s["stopId"].as_str().unwrap()).collect();
    ids.sort();
    assert_eq!(ids, ["631", "723", "901"]);

    let distances: Vec<f64> = stations.iter().map(|s| s["distance"].as_f64().unwrap()).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(stations.iter().all(|s| s["n_trains"].is_null()));
}

#[tokio::test]
async fn nearby_filters_by_family() {
    let (status, _, body) =
        send(app(vec![]), get("/api/stations/nearby?demo=true&family=Flushing")).await;

    assert_eq!(status, StatusCode::OK);
    let stations = body["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0]["stopId"], "723");
}

#[tokio::test]
async fn nearby_with_explicit_location() {
    let (status, _, body) = send(
        app(vec![]),
        get("/api/stations/nearby?lat=40.7527&lng=-73.9772&radius=0.6"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["demo"], false);
    let ids: Vec<&str> = body["stations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stopId"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"631"));
    assert!(ids.contains(&"R16"));
}

#[tokio::test]
async fn nearby_rejects_bad_queries() {
    let cases = [
        "/api/stations/nearby",
        "/api/stations/nearby?lat=40.75",
        "/api/stations/nearby?lat=140&lng=-73.9",
        "/api/stations/nearby?demo=true&radius=0",
        "/api/stations/nearby?demo=true&family=Canarsie",
    ];
    for uri in cases {
        let (status, _, body) = send(app(vec![]), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn families_lists_menu() {
    let (status, _, body) = send(app(vec![]), get("/api/families")).await;

    assert_eq!(status, StatusCode::OK);
    let families = body.as_array().unwrap();
    assert_eq!(families.len(), 10);
    assert_eq!(families[0]["name"], "7 Avenue");
    assert!(families.iter().any(|f| f["name"] == "Broadway"));
}
