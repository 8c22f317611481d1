//! Station catalog error types.

use std::path::PathBuf;

/// Errors that can occur while loading the static station dataset.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Dataset file could not be read
    #[error("failed to read station dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset file is not the expected JSON
    #[error("JSON parse error in {path}: {message}")]
    Json { path: PathBuf, message: String },

    /// Dataset parsed but contains no stops
    #[error("station dataset {0} is empty")]
    Empty(PathBuf),

    /// A row has coordinates outside the valid range
    #[error("stop {stop_id} has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates { stop_id: String, lat: f64, lon: f64 },
}
