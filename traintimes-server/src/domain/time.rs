//! Arrival timestamp handling.
//!
//! The feed writes `arrival_time` either as an RFC 3339 instant or as a
//! naive wall-clock time that is already in New York local time. Both are
//! normalised to UTC instants here so that "seconds until arrival" is a
//! plain subtraction against the server clock.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::New_York;

use super::error::DomainError;

/// Postgres renders `timestamptz::text` as `2024-06-01 12:34:56-04`.
const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Naive forms, interpreted as America/New_York.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a feed timestamp into a UTC instant.
///
/// # Examples
///
/// ```
/// use traintimes_server::domain::parse_arrival_time;
///
/// let with_offset = parse_arrival_time("2024-06-01T12:00:00-04:00").unwrap();
/// let eastern = parse_arrival_time("2024-06-01 12:00:00").unwrap();
/// assert_eq!(with_offset, eastern);
///
/// assert!(parse_arrival_time("arriving").is_err());
/// ```
pub fn parse_arrival_time(s: &str) -> Result<DateTime<Utc>, DomainError> {
    let s = s.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(s, OFFSET_FORMAT) {
        return Ok(t.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        let Ok(naive) = NaiveDateTime::parse_from_str(s, format) else {
            continue;
        };
        return match New_York.from_local_datetime(&naive) {
            LocalResult::Single(t) => Ok(t.with_timezone(&Utc)),
            // Fall-back hour: the feed does not say which one, take the first.
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(DomainError::NonexistentLocalTime(s.to_string())),
        };
    }

    Err(DomainError::InvalidTimestamp(s.to_string()))
}

/// Whole seconds from `now` until `arrival`, truncated toward zero.
///
/// Negative when the arrival is in the past.
pub fn seconds_until(arrival: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (arrival - now).num_seconds()
}
