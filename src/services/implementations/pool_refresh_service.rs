use crate::config::Config;
use crate::logger::{self, LogTag};
use crate::pools::{RefreshOutcome, Refresher};
use crate::services::{Service, ServiceHealth, ServiceMetrics};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Keeps the pool snapshot fresh: one refresh during initialization, then a
/// fixed-period loop.
pub struct PoolRefreshService {
    refresher: Arc<Refresher>,
    interval: Duration,
    periodic_enabled: bool,
}

impl PoolRefreshService {
    pub fn new(refresher: Arc<Refresher>, interval: Duration, periodic_enabled: bool) -> Self {
        Self {
            refresher,
            interval,
            periodic_enabled,
        }
    }

    pub fn from_config(refresher: Arc<Refresher>) -> Self {
        let refresh = crate::config::with_config(|cfg| cfg.refresh.clone());
        Self::new(
            refresher,
            Duration::from_secs(refresh.interval_secs),
            refresh.enabled,
        )
    }
}

/// Health of the refresh pipeline, shared by the service and `/api/status`
///
/// - `Starting` before any refresh has finished
/// - `Degraded` when the latest run failed (with or without a snapshot to fall back on)
/// - `Healthy` otherwise
pub fn refresh_health(refresher: &Refresher) -> ServiceHealth {
    let stats = refresher.stats();
    if !refresher.store().has_published() {
        if stats.failed_runs > 0 {
            return ServiceHealth::Degraded(
                stats
                    .last_error
                    .unwrap_or_else(|| "no successful refresh yet".to_string()),
            );
        }
        return ServiceHealth::Starting;
    }
    if stats.consecutive_failures > 0 {
        return ServiceHealth::Degraded(format!(
            "{} consecutive refresh failures, serving snapshot from {}",
            stats.consecutive_failures,
            stats
                .last_success_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        ));
    }
    ServiceHealth::Healthy
}

#[async_trait]
impl Service for PoolRefreshService {
    fn name(&self) -> &'static str {
        "pool_refresh"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn is_enabled(&self, _config: &Config) -> bool {
        // the startup refresh always runs; refresh.enabled only gates the loop
        true
    }

    async fn initialize(&mut self) -> Result<(), String> {
        logger::info(LogTag::Refresh, "Running initial pool refresh...");

        // A failed startup refresh is not fatal: queries serve an empty
        // snapshot until a later tick succeeds.
        if let RefreshOutcome::Failed { .. } = self.refresher.run_once().await {
            logger::warning(
                LogTag::Refresh,
                "Initial pool refresh failed; serving an empty snapshot until the next tick",
            );
        }
        Ok(())
    }

    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
        if !self.periodic_enabled {
            logger::info(
                LogTag::Refresh,
                "Periodic refresh disabled (refresh.enabled = false)",
            );
            return Ok(vec![]);
        }

        let refresher = Arc::clone(&self.refresher);
        let handle = tokio::spawn(refresher.run_periodic(self.interval, shutdown));
        Ok(vec![handle])
    }

    async fn health(&self) -> ServiceHealth {
        refresh_health(&self.refresher)
    }

    async fn metrics(&self) -> ServiceMetrics {
        let stats = self.refresher.stats();
        let mut metrics = ServiceMetrics::default();
        metrics
            .custom_metrics
            .insert("pools_cached".into(), self.refresher.store().len() as f64);
        metrics
            .custom_metrics
            .insert("refresh_success_total".into(), stats.successful_runs as f64);
        metrics
            .custom_metrics
            .insert("refresh_failure_total".into(), stats.failed_runs as f64);
        metrics.custom_metrics.insert(
            "refresh_consecutive_failures".into(),
            stats.consecutive_failures as f64,
        );
        if let Some(last) = stats.last_success_at {
            metrics
                .custom_metrics
                .insert("refresh_last_success_unix".into(), last.timestamp() as f64);
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{NetworkError, YieldWatchResult};
    use crate::pools::{PoolRecord, PoolSource, SnapshotStore};
    use parking_lot::Mutex;

    struct FlakySource {
        fail: Mutex<bool>,
    }

    #[async_trait]
    impl PoolSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch_pools(&self) -> YieldWatchResult<Vec<PoolRecord>> {
            if *self.fail.lock() {
                Err(NetworkError::HttpStatusError {
                    endpoint: "flaky".into(),
                    status: 502,
                }
                .into())
            } else {
                Ok(vec![PoolRecord {
                    project: "lido".into(),
                    base_yield_pct: Some(3.0),
                    ..Default::default()
                }])
            }
        }
    }

    fn service(fail: bool) -> (PoolRefreshService, Arc<FlakySource>) {
        let source = Arc::new(FlakySource {
            fail: Mutex::new(fail),
        });
        let refresher = Arc::new(Refresher::new(
            source.clone(),
            Arc::new(SnapshotStore::new()),
            Duration::from_secs(5),
        ));
        (
            PoolRefreshService::new(refresher, Duration::from_secs(30), true),
            source,
        )
    }

    #[tokio::test]
    async fn test_initialize_populates_snapshot() {
        let (mut svc, _) = service(false);
        assert_eq!(svc.health().await, ServiceHealth::Starting);

        svc.initialize().await.unwrap();
        assert_eq!(svc.health().await, ServiceHealth::Healthy);

        let metrics = svc.metrics().await;
        assert_eq!(metrics.custom_metrics["pools_cached"], 1.0);
        assert_eq!(metrics.custom_metrics["refresh_success_total"], 1.0);
    }

    #[tokio::test]
    async fn test_failed_initial_refresh_is_not_fatal() {
        let (mut svc, _) = service(true);
        assert!(svc.initialize().await.is_ok());
        assert!(svc.health().await.is_degraded());
        assert!(svc.refresher.store().is_empty());
    }

    #[tokio::test]
    async fn test_degraded_after_failure_keeps_data() {
        let (mut svc, source) = service(false);
        svc.initialize().await.unwrap();

        *source.fail.lock() = true;
        svc.refresher.run_once().await;

        assert!(svc.health().await.is_degraded());
        assert_eq!(svc.refresher.store().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_loop_spawns_nothing() {
        let (svc, _) = service(false);
        let mut svc = PoolRefreshService::new(Arc::clone(&svc.refresher), svc.interval, false);
        let handles = svc.start(Arc::new(Notify::new())).await.unwrap();
        assert!(handles.is_empty());
    }
}
