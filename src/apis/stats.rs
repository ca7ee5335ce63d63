/// Per-API request statistics
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time_ms: f64,
    pub last_request_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ApiStats {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        (self.successful_requests as f64 / self.total_requests as f64) * 100.0
    }
}

/// Accumulates [`ApiStats`] across concurrent requests
pub struct ApiStatsTracker {
    stats: RwLock<ApiStats>,
}

impl ApiStatsTracker {
    pub fn new() -> Self {
        Self {
            stats: RwLock::new(ApiStats::default()),
        }
    }

    /// Record one finished request and fold its latency into the running average
    pub async fn record_request(&self, success: bool, elapsed_ms: f64) {
        let mut stats = self.stats.write().await;
        stats.total_requests += 1;
        if success {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }

        let n = stats.total_requests as f64;
        stats.average_response_time_ms += (elapsed_ms - stats.average_response_time_ms) / n;
        stats.last_request_at = Some(chrono::Utc::now());
    }

    pub async fn get_stats(&self) -> ApiStats {
        self.stats.read().await.clone()
    }
}

impl Default for ApiStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
