// Service-mode and one-shot execution built on ServiceManager

use crate::{
    apis::DefiLlamaClient,
    config,
    errors::{YieldWatchError, YieldWatchResult},
    logger::{self, LogTag},
    pools::{PoolSource, RefreshOutcome, Refresher, SnapshotStore, YieldQueries},
    services::{implementations::PoolRefreshService, ServiceManager},
};
use std::sync::Arc;
use std::time::Duration;

/// Shared pieces every execution mode needs
struct Components {
    api: Arc<DefiLlamaClient>,
    refresher: Arc<Refresher>,
    queries: YieldQueries,
}

fn build_components() -> YieldWatchResult<Components> {
    let api = Arc::new(DefiLlamaClient::from_config().map_err(YieldWatchError::Configuration)?);
    let run_timeout = config::with_config(|cfg| Duration::from_secs(cfg.upstream.timeout_secs));

    let store = Arc::new(SnapshotStore::new());
    let source: Arc<dyn PoolSource> = api.clone();
    let refresher = Arc::new(Refresher::new(source, Arc::clone(&store), run_timeout));
    let queries = YieldQueries::from_config(store);

    Ok(Components {
        api,
        refresher,
        queries,
    })
}

fn load_configuration() -> YieldWatchResult<()> {
    config::load_config().map_err(|e| {
        YieldWatchError::Configuration(format!("{} ({})", e, config::config_path()))
    })?;

    let (url, interval, host, port) = config::with_config(|cfg| {
        (
            cfg.upstream.url.clone(),
            cfg.refresh.interval_secs,
            cfg.webserver.host.clone(),
            cfg.webserver.port,
        )
    });
    logger::info(
        LogTag::Config,
        &format!(
            "Configuration loaded from {} (upstream={}, interval={}s, bind={}:{})",
            config::config_path(),
            url,
            interval,
            host,
            port
        ),
    );

    if host == "0.0.0.0" {
        logger::warning(
            LogTag::Config,
            "Binding to 0.0.0.0 allows remote access - ensure firewall is configured",
        );
    }

    Ok(())
}

/// Full service lifecycle: load config, start services, wait for a signal,
/// stop services
pub async fn run_service() -> Result<(), String> {
    logger::info(LogTag::System, "yieldwatch starting up...");

    load_configuration().map_err(|e| e.to_string())?;
    let components = build_components().map_err(|e| e.to_string())?;

    let cfg = config::get_config_clone();
    let mut service_manager = ServiceManager::new(cfg);

    service_manager.register(Box::new(PoolRefreshService::from_config(Arc::clone(
        &components.refresher,
    ))));

    #[cfg(feature = "web")]
    {
        use crate::services::implementations::WebserverService;
        use crate::webserver::AppState;

        let state = Arc::new(AppState::new(
            components.queries.clone(),
            Arc::clone(&components.refresher),
            Some(Arc::clone(&components.api)),
        ));
        service_manager.register(Box::new(WebserverService::from_config(state)));
    }

    service_manager.start_all().await?;
    logger::info(LogTag::System, "All services started");
    log_service_health(&service_manager).await;

    wait_for_shutdown_signal().await?;

    log_service_metrics(&service_manager).await;
    logger::info(LogTag::System, "Stopping services...");
    service_manager.stop_all().await?;

    let stats = components.refresher.stats();
    let upstream = components.api.get_stats().await;
    logger::info(
        LogTag::System,
        &format!(
            "Shutdown complete ({} successful refreshes, {} failed, upstream success rate {:.1}% over {} requests)",
            stats.successful_runs,
            stats.failed_runs,
            upstream.success_rate(),
            upstream.total_requests
        ),
    );

    Ok(())
}

/// Refresh once, print the top yields and the named protocols, exit
pub async fn run_once_mode() -> anyhow::Result<()> {
    load_configuration()?;
    let components = build_components()?;

    match components.refresher.run_once().await {
        RefreshOutcome::Published { records, .. } => {
            logger::info(
                LogTag::Refresh,
                &format!(
                    "Fetched {} pools from {}",
                    records,
                    components.api.pools_url()
                ),
            );
        }
        RefreshOutcome::Failed { error } => {
            return Err(anyhow::Error::new(error).context("Pool refresh failed"));
        }
    }

    let top = components.queries.get_top(components.queries.default_count());
    println!("Top {} pools by APY:", top.len());
    for (rank, entry) in top.iter().enumerate() {
        println!("  {:>2}. {:<32} {:>10.4}%", rank + 1, entry.name, entry.apy);
    }

    println!("Named protocols:");
    for (label, apy) in components.queries.get_named_apy() {
        println!("  {:<32} {:>10.4}%", label, apy);
    }

    Ok(())
}

async fn log_service_health(manager: &ServiceManager) {
    let mut health: Vec<_> = manager.get_health().await.into_iter().collect();
    health.sort_by_key(|(name, _)| *name);

    for (name, status) in health {
        if status.is_healthy() {
            logger::info(LogTag::System, &format!("Service {}: {}", name, status.as_str()));
        } else {
            logger::warning(
                LogTag::System,
                &format!(
                    "Service {}: {}{}",
                    name,
                    status.as_str(),
                    status
                        .detail()
                        .map(|d| format!(" ({})", d))
                        .unwrap_or_default()
                ),
            );
        }
    }
}

async fn log_service_metrics(manager: &ServiceManager) {
    let mut metrics: Vec<_> = manager.get_metrics().await.into_iter().collect();
    metrics.sort_by_key(|(name, _)| *name);

    for (name, m) in metrics {
        let mut custom: Vec<_> = m.custom_metrics.iter().collect();
        custom.sort_by(|a, b| a.0.cmp(b.0));
        let custom = custom
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        logger::info(
            LogTag::System,
            &format!(
                "Service {} ran {}s with {} task(s) {}",
                name, m.uptime_seconds, m.task_count, custom
            ),
        );
    }
}

/// Wait for shutdown signal (Ctrl+C, SIGTERM on Unix)
async fn wait_for_shutdown_signal() -> Result<(), String> {
    logger::info(
        LogTag::System,
        "Waiting for shutdown signal (press Ctrl+C twice to force kill)",
    );

    #[cfg(unix)]
    let signal_name = {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint =
            signal(SignalKind::interrupt()).map_err(|e| format!("Failed to bind SIGINT: {}", e))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| format!("Failed to bind SIGTERM: {}", e))?;

        tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        }
    };

    #[cfg(not(unix))]
    let signal_name = {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| format!("Failed to listen for shutdown signal: {}", e))?;
        "CTRL_C"
    };

    logger::warning(
        LogTag::System,
        &format!(
            "Shutdown signal received ({}). Press Ctrl+C again to force kill.",
            signal_name
        ),
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::error(LogTag::System, "Second Ctrl+C detected, forcing exit.");
            std::process::exit(130);
        }
    });

    Ok(())
}
