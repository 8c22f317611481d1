//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedFeed;
use crate::feed::Backend;
use crate::stations::StationCatalog;

/// Arrival feed as configured at startup.
pub type Feed = CachedFeed<Backend, Backend>;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached dual-source arrivals feed
    pub feed: Arc<Feed>,

    /// Static station dataset
    pub catalog: StationCatalog,
}

impl AppState {
    /// Create a new app state.
    pub fn new(feed: Feed, catalog: StationCatalog) -> Self {
        Self {
            feed: Arc::new(feed),
            catalog,
        }
    }
}
