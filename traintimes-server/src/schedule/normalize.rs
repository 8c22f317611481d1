//! Arrival countdowns.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{FutureStop, Scheduled, Station, Train, parse_arrival_time, seconds_until};

/// Arrivals further in the past than this are stale.
pub const STALE_AFTER_SECS: i64 = 30;

/// Rider-facing label for a countdown in seconds.
///
/// # Examples
///
/// ```
/// use traintimes_server::schedule::countdown_label;
///
/// assert_eq!(countdown_label(-12), "arriving");
/// assert_eq!(countdown_label(45), "arriving");
/// assert_eq!(countdown_label(90), "1 minute");
/// assert_eq!(countdown_label(300), "5 minutes");
/// ```
pub fn countdown_label(seconds: i64) -> String {
    match seconds.div_euclid(60) {
        m if m <= 0 => "arriving".to_string(),
        1 => "1 minute".to_string(),
        m => format!("{m} minutes"),
    }
}

fn normalize<T: Scheduled>(items: Vec<T>, now: DateTime<Utc>) -> Vec<T> {
    let mut timed: Vec<(i64, T)> = items
        .into_iter()
        .filter_map(|item| match parse_arrival_time(item.arrival_time()) {
            Ok(arrival) => Some((seconds_until(arrival, now), item)),
            Err(e) => {
                warn!(error = %e, "dropping arrival with unreadable timestamp");
                None
            }
        })
        .filter(|(seconds, _)| *seconds >= -STALE_AFTER_SECS)
        .collect();

    timed.sort_by_key(|(seconds, _)| *seconds);

    timed
        .into_iter()
        .map(|(seconds, mut item)| {
            item.set_countdown(seconds, countdown_label(seconds));
            item
        })
        .collect()
}

/// Drop stale trains, sort soonest first and label each one.
///
/// Only the passage of time changes the result: running it again on its
/// own output with the same `now` gives the same list.
pub fn process_trains(trains: Vec<Train>, now: DateTime<Utc>) -> Vec<Train> {
    normalize(trains, now)
}

/// [`process_trains`] for the stops of a single trip.
pub fn process_future_stops(stops: Vec<FutureStop>, now: DateTime<Utc>) -> Vec<FutureStop> {
    normalize(stops, now)
}

/// Normalise both train slots of a station in place.
///
/// An unloaded slot becomes an empty list.
pub fn fix_arrival_time(station: &mut Station, now: DateTime<Utc>) {
    station.n_trains = Some(process_trains(
        station.n_trains.take().unwrap_or_default(),
        now,
    ));
    station.s_trains = Some(process_trains(
        station.s_trains.take().unwrap_or_default(),
        now,
    ));
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 16, 0, 0).unwrap()
    }

    fn train(seconds: i64) -> Train {
        Train {
            route_id: "Q".into(),
            trip_id: "084150_Q..N58R".into(),
            stop_id: "R16".into(),
            arrival_time: (now() + Duration::seconds(seconds)).to_rfc3339(),
            destination: "96 St".into(),
            time_diff_in_seconds: None,
            display: None,
        }
    }

    proptest! {
        /// Output is ordered soonest first
        #[test]
        fn output_is_monotonic(offsets in prop::collection::vec(-600i64..3600, 0..30)) {
            let processed = process_trains(offsets.iter().map(|&s| train(s)).collect(), now());
            let diffs: Vec<i64> = processed
                .iter()
                .map(|t| t.time_diff_in_seconds.unwrap())
                .collect();
            prop_assert!(diffs.windows(2).all(|w| w[0] <= w[1]));
        }

        /// Exactly the non-stale inputs survive
        #[test]
        fn keeps_exactly_fresh_rows(offsets in prop::collection::vec(-600i64..3600, 0..30)) {
            let processed = process_trains(offsets.iter().map(|&s| train(s)).collect(), now());
            let expected = offsets.iter().filter(|&&s| s >= -STALE_AFTER_SECS).count();
            prop_assert_eq!(processed.len(), expected);
        }

        /// Label agrees with the countdown
        #[test]
        fn label_matches_countdown(offset in -30i64..7200) {
            let processed = process_trains(vec![train(offset)], now());
            let t = &processed[0];
            prop_assert_eq!(t.time_diff_in_seconds, Some(offset));
            prop_assert_eq!(t.display.clone(), Some(countdown_label(offset)));
        }
    }
}
