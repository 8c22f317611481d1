//! File-backed arrival source for development without a database.
//!
//! Loads a JSON array of arrival rows and answers queries from memory, as
//! if it were the arrivals table.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::{Arrival, parse_arrival_time};

use super::error::NetworkFailure;
use super::source::{ArrivalQuery, ArrivalSource};

/// Arrival source that serves rows from a JSON file.
#[derive(Debug, Clone)]
pub struct FileArrivalSource {
    path: Option<PathBuf>,
    rows: Arc<RwLock<Vec<Arrival>>>,
}

impl FileArrivalSource {
    /// Load rows from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkFailure> {
        let path = path.as_ref();
        let rows = read_rows(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            rows: Arc::new(RwLock::new(rows)),
        })
    }

    /// Serve a fixed set of rows.
    pub fn from_rows(rows: Vec<Arrival>) -> Self {
        Self {
            path: None,
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Re-read the file the source was loaded from.
    ///
    /// On failure the current rows are kept. Returns the new row count.
    pub async fn reload(&self) -> Result<usize, NetworkFailure> {
        let Some(path) = &self.path else {
            return Err(NetworkFailure::Unavailable(
                "source was not loaded from a file".to_string(),
            ));
        };
        let rows = read_rows(path)?;
        let count = rows.len();
        *self.rows.write().await = rows;
        Ok(count)
    }

    /// Re-read the file every `period` in a background task.
    ///
    /// `on_reload` runs with the new row count after each successful
    /// reload. Failed reloads keep the current rows.
    pub fn spawn_reloader<F>(&self, period: Duration, on_reload: F) -> JoinHandle<()>
    where
        F: Fn(usize) + Send + 'static,
    {
        let source = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                match source.reload().await {
                    Ok(rows) => {
                        info!(rows, "reloaded arrivals file");
                        on_reload(rows);
                    }
                    Err(e) => warn!(error = %e, "failed to reload arrivals file"),
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn read_rows(path: &Path) -> Result<Vec<Arrival>, NetworkFailure> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        NetworkFailure::Unavailable(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&json).map_err(|e| {
        NetworkFailure::Unavailable(format!("failed to parse {}: {e}", path.display()))
    })
}

impl ArrivalSource for FileArrivalSource {
    async fn fetch(&self, query: &ArrivalQuery) -> Result<Vec<Arrival>, NetworkFailure> {
        let rows = self.rows.read().await;
        let mut matching: Vec<Arrival> =
            rows.iter().filter(|r| query.matches(r)).cloned().collect();

        if let ArrivalQuery::Trip(_) = query {
            matching.sort_by_key(|r| parse_arrival_time(&r.arrival_time).ok());
        }

        Ok(matching)
    }
}
