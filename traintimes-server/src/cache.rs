//! Short-lived cache of arrival fetches.
//!
//! Riders refresh often and many of them stand near the same stations, so
//! identical queries within a few seconds share one fetch. The TTL is kept
//! at the client's own refresh interval so a cached answer is never older
//! than one the client would have fetched itself.
//!
//! Only successful fetches are cached; a failure is retried in full on the
//! next request.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::feed::{ArrivalQuery, ArrivalSource, FetchCoordinator, FetchExhausted, Fetched};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15),
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

/// Fetch coordinator with caching.
///
/// Keys are canonical [`ArrivalQuery`] values, so the same stops in any
/// order hit the same entry.
pub struct CachedFeed<P, S> {
    coordinator: FetchCoordinator<P, S>,
    responses: MokaCache<ArrivalQuery, Arc<Fetched>>,
}

impl<P: ArrivalSource, S: ArrivalSource> CachedFeed<P, S> {
    pub fn new(coordinator: FetchCoordinator<P, S>, config: &CacheConfig) -> Self {
        let responses = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            coordinator,
            responses,
        }
    }

    /// Fetch through the cache.
    pub async fn fetch(&self, query: ArrivalQuery) -> Result<Arc<Fetched>, FetchExhausted> {
        if let Some(cached) = self.responses.get(&query).await {
            debug!(?query, "arrival cache hit");
            return Ok(cached);
        }

        let fetched = Arc::new(self.coordinator.fetch(&query).await?);
        self.responses.insert(query, Arc::clone(&fetched)).await;

        Ok(fetched)
    }

    /// Arrivals at any of the given stops.
    pub async fn fetch_arrivals(
        &self,
        stop_ids: &[String],
    ) -> Result<Arc<Fetched>, FetchExhausted> {
        self.fetch(ArrivalQuery::stops(stop_ids.iter().cloned())).await
    }

    /// Every stop of one trip, earliest first.
    pub async fn fetch_trip(&self, trip_id: &str) -> Result<Arc<Fetched>, FetchExhausted> {
        self.fetch(ArrivalQuery::trip(trip_id)).await
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.responses.invalidate_all();
    }
}
