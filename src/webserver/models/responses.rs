/// API response type definitions
use crate::apis::ApiStats;
use crate::pools::RefreshStats;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Simple health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Snapshot and refresh status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Refresh pipeline health: "starting", "degraded" or "healthy"
    pub status: String,
    /// Reason when degraded
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub pool_count: usize,
    pub snapshot_generation: u64,
    pub snapshot_published_at: Option<DateTime<Utc>>,
    pub refresh: RefreshStats,
    pub upstream: Option<ApiStats>,
}
