/// Pool refresher
///
/// Fetches the upstream feed, and on full success publishes a new snapshot.
/// Any failure (network, status, timeout, bad payload) is logged and counted;
/// the current snapshot is left untouched and the next tick tries again.
use super::store::SnapshotStore;
use super::types::PoolRecord;
use crate::errors::{NetworkError, YieldWatchError, YieldWatchResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

/// Source of pool records (the DefiLlama client in production)
#[async_trait]
pub trait PoolSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch and parse the complete pool list
    async fn fetch_pools(&self) -> YieldWatchResult<Vec<PoolRecord>>;
}

/// Result of a single refresh run
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Published {
        records: usize,
        generation: u64,
        elapsed_ms: u64,
    },
    Failed {
        error: YieldWatchError,
    },
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RefreshOutcome::Published { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RefreshStats {
    pub successful_runs: u64,
    pub failed_runs: u64,
    pub consecutive_failures: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_record_count: usize,
}

pub struct Refresher {
    source: Arc<dyn PoolSource>,
    store: Arc<SnapshotStore>,
    run_timeout: Duration,
    stats: Mutex<RefreshStats>,
}

impl Refresher {
    pub fn new(source: Arc<dyn PoolSource>, store: Arc<SnapshotStore>, run_timeout: Duration) -> Self {
        Self {
            source,
            store,
            run_timeout,
            stats: Mutex::new(RefreshStats::default()),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn stats(&self) -> RefreshStats {
        self.stats.lock().clone()
    }

    /// Fetch once and publish on success; never returns an error
    pub async fn run_once(&self) -> RefreshOutcome {
        let start = Instant::now();

        let fetched = match tokio::time::timeout(self.run_timeout, self.source.fetch_pools()).await {
            Ok(result) => result,
            Err(_) => Err(NetworkError::ConnectionTimeout {
                endpoint: self.source.name().to_string(),
                timeout_ms: self.run_timeout.as_millis() as u64,
            }
            .into()),
        };

        match fetched {
            Ok(records) => {
                let count = records.len();
                let snapshot = self.store.publish(records);
                let elapsed_ms = start.elapsed().as_millis() as u64;

                {
                    let mut stats = self.stats.lock();
                    stats.successful_runs += 1;
                    stats.consecutive_failures = 0;
                    stats.last_success_at = snapshot.published_at();
                    stats.last_record_count = count;
                }

                logger::info(
                    LogTag::Refresh,
                    &format!(
                        "Refreshed {} pools from {} in {}ms (snapshot #{})",
                        count,
                        self.source.name(),
                        elapsed_ms,
                        snapshot.generation()
                    ),
                );

                RefreshOutcome::Published {
                    records: count,
                    generation: snapshot.generation(),
                    elapsed_ms,
                }
            }
            Err(error) => {
                {
                    let mut stats = self.stats.lock();
                    stats.failed_runs += 1;
                    stats.consecutive_failures += 1;
                    stats.last_failure_at = Some(Utc::now());
                    stats.last_error = Some(error.to_string());
                }

                logger::error(
                    LogTag::Refresh,
                    &format!(
                        "Failed to refresh pools from {} ({} failure, keeping {} cached pools): {}",
                        self.source.name(),
                        error.kind(),
                        self.store.len(),
                        error
                    ),
                );

                RefreshOutcome::Failed { error }
            }
        }
    }

    /// Run `run_once` every `interval` until `shutdown` is notified
    ///
    /// The first tick fires one full interval from now; the startup refresh is
    /// expected to have run already.
    pub async fn run_periodic(self: Arc<Self>, interval: Duration, shutdown: Arc<Notify>) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        logger::info(
            LogTag::Refresh,
            &format!("Pool refresh loop started (every {}s)", interval.as_secs()),
        );

        // created once so a notification that lands mid-run is not lost
        let shutdown_signal = shutdown.notified();
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                _ = &mut shutdown_signal => {
                    logger::info(LogTag::Refresh, "Pool refresh loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    logger::debug(LogTag::Refresh, "Refresh tick");
                    self.run_once().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DataError;
    use crate::pools::query::{lookup_by_exact_project, top_by_yield};
    use crate::pools::types::ProtocolYield;
    use std::collections::VecDeque;

    /// Replays queued results, one per fetch
    struct ScriptedSource {
        results: Mutex<VecDeque<YieldWatchResult<Vec<PoolRecord>>>>,
    }

    impl ScriptedSource {
        fn new(results: Vec<YieldWatchResult<Vec<PoolRecord>>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
            })
        }
    }

    #[async_trait]
    impl PoolSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_pools(&self) -> YieldWatchResult<Vec<PoolRecord>> {
            self.results
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    struct HangingSource;

    #[async_trait]
    impl PoolSource for HangingSource {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn fetch_pools(&self) -> YieldWatchResult<Vec<PoolRecord>> {
            std::future::pending().await
        }
    }

    fn record(project: &str, base: f64) -> PoolRecord {
        PoolRecord {
            project: project.to_string(),
            base_yield_pct: Some(base),
            ..Default::default()
        }
    }

    fn refresher(source: Arc<dyn PoolSource>) -> Refresher {
        Refresher::new(source, Arc::new(SnapshotStore::new()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_successful_run_publishes_snapshot() {
        let payload = crate::pools::parser::parse_pools_payload(
            r#"{"data":[{"project":"aave-v3","apyBase":1.5,"apyReward":0.5},{"project":"X","apyBase":2.0}]}"#,
        );
        let refresher = refresher(ScriptedSource::new(vec![payload.map_err(Into::into)]));

        let outcome = refresher.run_once().await;
        assert!(outcome.is_published());

        let snapshot = refresher.store().current();
        assert_eq!(lookup_by_exact_project(&snapshot, "aave-v3"), 2.0);
        assert_eq!(
            top_by_yield(&snapshot, 1),
            vec![ProtocolYield {
                name: "aave-v3".to_string(),
                apy: 2.0
            }]
        );

        let stats = refresher.stats();
        assert_eq!(stats.successful_runs, 1);
        assert_eq!(stats.last_record_count, 2);
        assert!(stats.last_success_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_run_keeps_previous_snapshot() {
        let refresher = refresher(ScriptedSource::new(vec![
            Ok(vec![record("lido", 3.0)]),
            Err(DataError::UnexpectedShape("object without a 'data' field".into()).into()),
            Err(NetworkError::HttpStatusError {
                endpoint: "test".into(),
                status: 500,
            }
            .into()),
        ]));

        assert!(refresher.run_once().await.is_published());
        let before = refresher.store().current();

        assert!(!refresher.run_once().await.is_published());
        assert!(!refresher.run_once().await.is_published());

        let after = refresher.store().current();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.records(), &[record("lido", 3.0)][..]);

        let stats = refresher.stats();
        assert_eq!(stats.successful_runs, 1);
        assert_eq!(stats.failed_runs, 2);
        assert_eq!(stats.consecutive_failures, 2);
        assert!(stats.last_error.unwrap().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_failure_before_first_success_leaves_store_empty() {
        let refresher = refresher(ScriptedSource::new(vec![Err(NetworkError::RequestFailed {
            endpoint: "test".into(),
            message: "connection refused".into(),
        }
        .into())]));

        let outcome = refresher.run_once().await;
        assert!(matches!(outcome, RefreshOutcome::Failed { ref error } if error.is_transient()));
        assert!(refresher.store().is_empty());
        assert!(!refresher.store().has_published());
    }

    #[tokio::test]
    async fn test_success_after_failure_resets_streak() {
        let refresher = refresher(ScriptedSource::new(vec![
            Err(DataError::InvalidJson("eof".into()).into()),
            Ok(vec![record("a", 1.0)]),
        ]));
        refresher.run_once().await;
        refresher.run_once().await;
        assert_eq!(refresher.stats().consecutive_failures, 0);
        assert_eq!(refresher.store().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_source_times_out() {
        let store = Arc::new(SnapshotStore::new());
        let refresher = Refresher::new(Arc::new(HangingSource), store, Duration::from_secs(10));

        let outcome = refresher.run_once().await;
        match outcome {
            RefreshOutcome::Failed { error } => {
                assert_eq!(
                    error,
                    YieldWatchError::Network(NetworkError::ConnectionTimeout {
                        endpoint: "hanging".into(),
                        timeout_ms: 10_000,
                    })
                );
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_loop_ticks_and_stops() {
        let source = ScriptedSource::new(vec![
            Ok(vec![record("a", 1.0)]),
            Ok(vec![record("a", 1.0), record("b", 2.0)]),
        ]);
        let refresher = Arc::new(refresher(source));
        let shutdown = Arc::new(Notify::new());

        let handle = tokio::spawn(
            Arc::clone(&refresher).run_periodic(Duration::from_secs(30), Arc::clone(&shutdown)),
        );

        // nothing runs before the first full interval
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(refresher.stats().successful_runs, 0);

        tokio::time::sleep(Duration::from_secs(32)).await;
        assert_eq!(refresher.stats().successful_runs, 2);
        assert_eq!(refresher.store().len(), 2);

        shutdown.notify_waiters();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_loop_continues_after_failed_tick() {
        let source = ScriptedSource::new(vec![
            Err(NetworkError::HttpStatusError {
                endpoint: "scripted".into(),
                status: 502,
            }
            .into()),
            Ok(vec![record("a", 1.0)]),
        ]);
        let refresher = Arc::new(refresher(source));
        let shutdown = Arc::new(Notify::new());

        let handle = tokio::spawn(
            Arc::clone(&refresher).run_periodic(Duration::from_secs(30), Arc::clone(&shutdown)),
        );

        tokio::time::sleep(Duration::from_secs(31)).await;
        let stats = refresher.stats();
        assert_eq!(stats.failed_runs, 1);
        assert_eq!(stats.successful_runs, 0);
        assert!(refresher.store().is_empty());

        tokio::time::sleep(Duration::from_secs(30)).await;
        let stats = refresher.stats();
        assert_eq!(stats.successful_runs, 1);
        assert_eq!(stats.consecutive_failures, 0);
        assert_eq!(refresher.store().len(), 1);

        shutdown.notify_waiters();
        handle.await.unwrap();
    }
}
