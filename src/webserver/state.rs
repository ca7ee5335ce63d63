/// Shared application state for the webserver
///
/// Contains references to the query interface and refresh bookkeeping that
/// route handlers read from.
use crate::apis::DefiLlamaClient;
use crate::pools::{Refresher, YieldQueries};
use std::sync::Arc;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Snapshot-backed queries
    pub queries: YieldQueries,

    /// Refresh statistics for status reporting
    pub refresher: Arc<Refresher>,

    /// Upstream client (for request stats), absent when a custom source is used
    pub api: Option<Arc<DefiLlamaClient>>,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        queries: YieldQueries,
        refresher: Arc<Refresher>,
        api: Option<Arc<DefiLlamaClient>>,
    ) -> Self {
        Self {
            queries,
            refresher,
            api,
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }
}
