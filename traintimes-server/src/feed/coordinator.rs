//! Dual-source fetching with retries and a timed failover.

use std::fmt;
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::domain::Arrival;

use super::error::{FetchExhausted, NetworkFailure};
use super::source::{ArrivalQuery, ArrivalSource};

/// Which source answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    Primary,
    Secondary,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Primary => write!(f, "primary"),
            SourceRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// Rows from whichever source won.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub source: SourceRole,
    pub rows: Vec<Arrival>,
}

/// Retry budget for one source.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Pause between a failed attempt and the next one
    pub delay: Duration,
    /// An attempt still running after this long counts as failed
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(200),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }
}

/// Timing for a whole fetch.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Start the secondary if the primary has not succeeded by then
    pub failover_after: Duration,
    pub primary: RetryPolicy,
    pub secondary: RetryPolicy,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            failover_after: Duration::from_millis(500),
            primary: RetryPolicy::default(),
            secondary: RetryPolicy::default(),
        }
    }
}

impl FetchPolicy {
    pub fn with_failover_after(mut self, after: Duration) -> Self {
        self.failover_after = after;
        self
    }

    pub fn with_primary(mut self, policy: RetryPolicy) -> Self {
        self.primary = policy;
        self
    }

    pub fn with_secondary(mut self, policy: RetryPolicy) -> Self {
        self.secondary = policy;
        self
    }

    /// Use the same retry budget for both sources.
    pub fn with_retry(self, policy: RetryPolicy) -> Self {
        self.with_primary(policy.clone()).with_secondary(policy)
    }
}

/// Races a primary and a secondary arrival source.
///
/// The primary starts immediately. If it has not succeeded within
/// `failover_after`, the secondary starts too, and the first of the two to
/// succeed answers the request. A primary that gives up early does not
/// start the secondary sooner. The request fails only once both have
/// exhausted their retries.
///
/// Work still running when a request is answered is left to finish in the
/// background and its result is discarded.
pub struct FetchCoordinator<P, S> {
    primary: Arc<P>,
    secondary: Arc<S>,
    policy: FetchPolicy,
}

impl<P: ArrivalSource, S: ArrivalSource> FetchCoordinator<P, S> {
    pub fn new(primary: P, secondary: S, policy: FetchPolicy) -> Self {
        Self {
            primary: Arc::new(primary),
            secondary: Arc::new(secondary),
            policy,
        }
    }

    /// Arrivals at any of the given stops.
    pub async fn fetch_arrivals(&self, stop_ids: &[String]) -> Result<Fetched, FetchExhausted> {
        self.fetch(&ArrivalQuery::stops(stop_ids.iter().cloned())).await
    }

    /// Every stop of one trip, earliest first.
    pub async fn fetch_trip(&self, trip_id: &str) -> Result<Fetched, FetchExhausted> {
        self.fetch(&ArrivalQuery::trip(trip_id)).await
    }

    pub async fn fetch(&self, query: &ArrivalQuery) -> Result<Fetched, FetchExhausted> {
        let mut primary = Some(tokio::spawn(with_retries(
            Arc::clone(&self.primary),
            query.clone(),
            self.policy.primary.clone(),
            SourceRole::Primary,
        )));
        let mut timer = Some(tokio::spawn(sleep(self.policy.failover_after)));
        let mut secondary: Option<JoinHandle<Result<Vec<Arrival>, NetworkFailure>>> = None;

        let mut primary_failure: Option<NetworkFailure> = None;
        let mut secondary_failure: Option<NetworkFailure> = None;

        loop {
            tokio::select! {
                biased;

                joined = wait_for(&mut primary), if primary.is_some() => {
                    primary = None;
                    match settle(joined) {
                        Ok(rows) => {
                            if let Some(timer) = timer.take() {
                                timer.abort();
                            }
                            return Ok(Fetched { source: SourceRole::Primary, rows });
                        }
                        Err(e) => {
                            warn!(error = %e, "primary arrival source exhausted");
                            primary_failure = Some(e);
                        }
                    }
                }

                joined = wait_for(&mut secondary), if secondary.is_some() => {
                    secondary = None;
                    match settle(joined) {
                        Ok(rows) => {
                            return Ok(Fetched { source: SourceRole::Secondary, rows });
                        }
                        Err(e) => {
                            warn!(error = %e, "secondary arrival source exhausted");
                            secondary_failure = Some(e);
                        }
                    }
                }

                _ = wait_for(&mut timer), if timer.is_some() => {
                    timer = None;
                    info!(
                        after = ?self.policy.failover_after,
                        "primary arrival source slow, starting secondary"
                    );
                    secondary = Some(tokio::spawn(with_retries(
                        Arc::clone(&self.secondary),
                        query.clone(),
                        self.policy.secondary.clone(),
                        SourceRole::Secondary,
                    )));
                }

                else => {
                    return Err(exhausted(primary_failure, secondary_failure));
                }
            }

            if primary_failure.is_some() && secondary_failure.is_some() {
                return Err(exhausted(primary_failure, secondary_failure));
            }
        }
    }
}

fn exhausted(primary: Option<NetworkFailure>, secondary: Option<NetworkFailure>) -> FetchExhausted {
    let missing = || NetworkFailure::Task("source finished without a result".to_string());
    FetchExhausted {
        primary: primary.unwrap_or_else(missing),
        secondary: secondary.unwrap_or_else(missing),
    }
}

/// Await a task if there is one, otherwise never resolve.
async fn wait_for<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => pending().await,
    }
}

fn settle(
    joined: Result<Result<Vec<Arrival>, NetworkFailure>, JoinError>,
) -> Result<Vec<Arrival>, NetworkFailure> {
    joined.unwrap_or_else(|e| Err(e.into()))
}

/// Run one source until it succeeds or its budget is spent.
///
/// Returns the last failure when every attempt fails.
async fn with_retries<S: ArrivalSource>(
    source: Arc<S>,
    query: ArrivalQuery,
    policy: RetryPolicy,
    role: SourceRole,
) -> Result<Vec<Arrival>, NetworkFailure> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        let outcome = match timeout(policy.attempt_timeout, source.fetch(&query)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(NetworkFailure::Timeout(policy.attempt_timeout)),
        };

        match outcome {
            Ok(rows) => {
                debug!(%role, attempt, rows = rows.len(), "arrival source answered");
                return Ok(rows);
            }
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!(%role, attempt, error = %e, "arrival source attempt failed, retrying");
                attempt += 1;
                sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
