//! Terminal arrival board.
//!
//! Polls the server for the stations near a location and prints the next
//! few trains in each direction, refreshing every 15 seconds.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use futures::future::join_all;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use traintimes_server::client::{
    ClientConfig, Countdown, LocationSource, LocationStatus, Locator, TrainTimesClient,
};
use traintimes_server::domain::{Coordinates, Direction, Station};
use traintimes_server::web::NearbyQuery;

#[derive(Parser, Debug)]
#[command(about = "Live subway arrivals for the stations around you")]
struct Args {
    /// Arrival board server
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Latitude of a fixed location
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of a fixed location
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// JSON file holding {"lat": .., "lng": ..}, re-read when stale
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    location_file: Option<PathBuf>,

    /// Pretend to be at Grand Central
    #[arg(long, conflicts_with_all = ["lat", "lng", "location_file"])]
    demo: bool,

    /// Switch to Grand Central when the location cannot be found
    #[arg(long, conflicts_with = "demo")]
    demo_fallback: bool,

    /// Search radius in miles
    #[arg(long)]
    radius: Option<f64>,

    /// Only show one line family, e.g. "Broadway"
    #[arg(long)]
    family: Option<String>,

    /// Trains to show per direction
    #[arg(long, default_value_t = 4)]
    trains: usize,

    /// Print one board and exit
    #[arg(long)]
    once: bool,
}

impl Args {
    fn location_source(&self) -> Option<LocationSource> {
        if self.demo {
            return Some(LocationSource::Demo);
        }
        if let Some(path) = &self.location_file {
            return Some(LocationSource::File(path.clone()));
        }
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(LocationSource::Fixed(Coordinates::new(lat, lng))),
            _ => None,
        }
    }
}

/// The current location, or `None` to skip this refresh.
///
/// With `demo_fallback`, a failed lookup switches the locator to the demo
/// location for good.
fn locate(locator: &mut Locator, now: DateTime<Utc>, demo_fallback: bool) -> Option<Coordinates> {
    match locator.locate(now) {
        Ok(location) => Some(location),
        Err(e) if demo_fallback => {
            warn!(error = %e, "no location, switching to the demo location");
            *locator = Locator::new(LocationSource::Demo);
            locator.locate(now).ok()
        }
        Err(e) => {
            warn!(error = %e, "no location, skipping refresh");
            None
        }
    }
}

/// One direction of a station, as printed.
fn render_direction(out: &mut String, station: &Station, direction: Direction, max: usize) {
    if !station.serves(direction) {
        return;
    }
    let arrow = match direction {
        Direction::North => "↑",
        Direction::South => "↓",
    };
    let _ = write!(out, "  {arrow} {}: ", station.headsign(direction));

    match station.trains(direction) {
        None => out.push_str("unavailable"),
        Some([]) => out.push_str("no trains"),
        Some(trains) => {
            let listed: Vec<String> = trains
                .iter()
                .take(max)
                .map(|t| {
                    format!(
                        "({}) {}",
                        t.route_id,
                        t.display.as_deref().unwrap_or("?")
                    )
                })
                .collect();
            out.push_str(&listed.join(", "));
        }
    }
    out.push('\n');
}

fn render_station(station: &Station, max: usize) -> String {
    let mut out = format!(
        "{} [{}] {:.2} mi\n",
        station.stop_name, station.stop_id, station.distance
    );
    render_direction(&mut out, station, Direction::North, max);
    render_direction(&mut out, station, Direction::South, max);
    out
}

async fn refresh(client: &TrainTimesClient, locator: &mut Locator, args: &Args) {
    let now = Utc::now();
    let Some(location) = locate(locator, now, args.demo_fallback) else {
        return;
    };

    let query = NearbyQuery {
        lat: Some(location.lat),
        lng: Some(location.lng),
        radius: args.radius,
        family: args.family.clone(),
        demo: locator.source().is_demo(),
    };

    let nearby = match client.nearby_stations(&query).await {
        Ok(nearby) => nearby,
        Err(e) => {
            error!(error = %e, "failed to find nearby stations");
            return;
        }
    };

    if nearby.stations.is_empty() {
        println!("No stations within {} mi.", nearby.radius);
        return;
    }

    let boards = join_all(
        nearby
            .stations
            .iter()
            .map(|station| client.station_board_or_unloaded(station, now)),
    )
    .await;

    println!("{}", now.with_timezone(&chrono_tz::America::New_York).format("%H:%M:%S"));
    for board in &boards {
        print!("{}", render_station(board, args.trains));
    }
    println!();
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let Some(source) = args.location_source() else {
        error!("give --lat and --lng, --location-file, or --demo");
        return ExitCode::FAILURE;
    };
    let mut locator = Locator::new(source);

    let client = match TrainTimesClient::new(ClientConfig::default().with_base_url(&args.server)) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create client");
            return ExitCode::FAILURE;
        }
    };

    refresh(&client, &mut locator, &args).await;
    if args.once {
        return match locator.status() {
            LocationStatus::Found(_) => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        };
    }

    info!(server = client.base_url(), "watching");
    let mut countdown = Countdown::default();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await; // First tick is immediate, skip it
    loop {
        ticker.tick().await;
        if countdown.tick() {
            refresh(&client, &mut locator, &args).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traintimes_server::domain::Train;
    use traintimes_server::nearby::GRAND_CENTRAL;

    fn train(route: &str, display: &str) -> Train {
        Train {
            route_id: route.into(),
            trip_id: format!("080000_{route}..N"),
            stop_id: "631".into(),
            arrival_time: "2024-06-01T12:05:00-04:00".into(),
            destination: "Woodlawn".into(),
            time_diff_in_seconds: Some(0),
            display: Some(display.into()),
        }
    }

    fn station() -> Station {
        Station {
            stop_id: "631".into(),
            stop_name: "Grand Central-42 St".into(),
            n_headsign: "Uptown & The Bronx".into(),
            s_headsign: "Downtown & Brooklyn".into(),
            coordinates: Coordinates::new(40.751776, -73.976848),
            distance: 0.031,
            n_trains: None,
            s_trains: None,
        }
    }

    #[test]
    fn renders_loaded_board() {
        let mut station = station();
        station.n_trains = Some(vec![
            train("4", "arriving"),
            train("6", "2 minutes"),
            train("5", "4 minutes"),
            train("6", "6 minutes"),
            train("4", "9 minutes"),
        ]);
        station.s_trains = Some(vec![]);

        let rendered = render_station(&station, 4);
        assert!(rendered.ends_with('\n'));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            [
                "Grand Central-42 St [631] 0.03 mi",
                "  ↑ Uptown & The Bronx: (4) arriving, (6) 2 minutes, (5) 4 minutes, (6) 6 minutes",
                "  ↓ Downtown & Brooklyn: no trains",
            ]
        );
    }

    #[test]
    fn unknown_trains_and_unserved_direction() {
        let mut station = station();
        station.s_headsign = String::new();

        let rendered = render_station(&station, 4);
        assert!(rendered.contains("↑ Uptown & The Bronx: unavailable"));
        assert!(!rendered.contains('↓'));
    }

    #[test]
    fn location_source_from_args() {
        let args = Args::parse_from(["traintimes-watch", "--lat", "40.73", "--lng", "-73.99"]);
        assert_eq!(
            args.location_source(),
            Some(LocationSource::Fixed(Coordinates::new(40.73, -73.99)))
        );

        let args = Args::parse_from(["traintimes-watch", "--demo"]);
        assert_eq!(args.location_source(), Some(LocationSource::Demo));

        let args = Args::parse_from(["traintimes-watch"]);
        assert_eq!(args.location_source(), None);
    }

    #[test]
    fn missing_location_falls_back_to_demo() {
        let now = Utc::now();
        let missing = LocationSource::File("/nonexistent/location.json".into());

        let mut locator = Locator::new(missing.clone());
        assert_eq!(locate(&mut locator, now, false), None);
        assert_eq!(locator.status(), LocationStatus::NotFound);

        let mut locator = Locator::new(missing);
        assert_eq!(locate(&mut locator, now, true), Some(GRAND_CENTRAL));
        assert!(locator.source().is_demo());

        let args = Args::parse_from([
            "traintimes-watch",
            "--location-file",
            "loc.json",
            "--demo-fallback",
        ]);
        assert!(args.demo_fallback);
    }

    #[test]
    fn demo_conflicts_with_coordinates() {
        let parsed =
            Args::try_parse_from(["traintimes-watch", "--demo", "--lat", "1", "--lng", "2"]);
        assert!(parsed.is_err());
    }
}
