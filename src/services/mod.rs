mod health;
mod metrics;
pub mod implementations;

pub use health::ServiceHealth;
pub use metrics::{MetricsCollector, ServiceMetrics};

use crate::config::Config;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// How long `stop_all` waits for each task handle
const SERVICE_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Core service trait that all services must implement
#[async_trait]
pub trait Service: Send + Sync {
    /// Unique service identifier
    fn name(&self) -> &'static str;

    /// Service priority (lower = starts earlier, stops later)
    fn priority(&self) -> i32 {
        100
    }

    /// Services this service depends on
    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Check if service is enabled in configuration
    fn is_enabled(&self, _config: &Config) -> bool {
        true
    }

    /// Initialize the service
    async fn initialize(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Start the service
    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String>;

    /// Stop the service
    async fn stop(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Check service health
    async fn health(&self) -> ServiceHealth {
        ServiceHealth::Healthy
    }

    /// Get service metrics
    async fn metrics(&self) -> ServiceMetrics {
        ServiceMetrics::default()
    }
}

pub struct ServiceManager {
    services: HashMap<&'static str, Box<dyn Service>>,
    handles: HashMap<&'static str, Vec<JoinHandle<()>>>,
    shutdown: Arc<Notify>,
    config: Config,
    metrics_collector: MetricsCollector,
}

impl ServiceManager {
    pub fn new(config: Config) -> Self {
        Self {
            services: HashMap::new(),
            handles: HashMap::new(),
            shutdown: Arc::new(Notify::new()),
            config,
            metrics_collector: MetricsCollector::new(),
        }
    }

    /// Register a service
    pub fn register(&mut self, service: Box<dyn Service>) {
        let name = service.name();
        self.services.insert(name, service);
    }

    /// Start all enabled services in dependency and priority order
    pub async fn start_all(&mut self) -> Result<(), String> {
        logger::info(LogTag::System, "Starting all services...");

        let enabled_services: Vec<&'static str> = self
            .services
            .iter()
            .filter(|(_, service)| service.is_enabled(&self.config))
            .map(|(name, _)| *name)
            .collect();

        let ordered = self.resolve_startup_order(&enabled_services)?;
        logger::debug(
            LogTag::System,
            &format!("Service startup order: {:?}", ordered),
        );

        for service_name in ordered {
            if let Some(service) = self.services.get_mut(service_name) {
                logger::debug(
                    LogTag::System,
                    &format!("Initializing service: {}", service_name),
                );
                service.initialize().await?;

                let handles = service.start(self.shutdown.clone()).await?;
                self.metrics_collector
                    .start_monitoring(service_name, handles.len());
                self.handles.insert(service_name, handles);

                logger::info(
                    LogTag::System,
                    &format!("Service started: {}", service_name),
                );
            }
        }

        logger::info(LogTag::System, "All services started");
        Ok(())
    }

    /// Stop all services in reverse startup order
    pub async fn stop_all(&mut self) -> Result<(), String> {
        logger::info(LogTag::System, "Stopping all services...");

        self.shutdown.notify_waiters();

        let running_services: Vec<&'static str> = self.handles.keys().copied().collect();
        let mut ordered = self.resolve_startup_order(&running_services)?;
        ordered.reverse();

        for service_name in ordered {
            if let Some(service) = self.services.get_mut(service_name) {
                if let Err(e) = service.stop().await {
                    logger::warning(
                        LogTag::System,
                        &format!("Service stop error for {}: {}", service_name, e),
                    );
                }

                if let Some(handles) = self.handles.remove(service_name) {
                    for handle in handles {
                        if tokio::time::timeout(SERVICE_STOP_TIMEOUT, handle).await.is_err() {
                            logger::warning(
                                LogTag::System,
                                &format!(
                                    "Service {} did not stop within {}s",
                                    service_name,
                                    SERVICE_STOP_TIMEOUT.as_secs()
                                ),
                            );
                        }
                    }
                }
                self.metrics_collector.stop_monitoring(service_name);

                logger::info(
                    LogTag::System,
                    &format!("Service stopped: {}", service_name),
                );
            }
        }

        logger::info(LogTag::System, "All services stopped");
        Ok(())
    }

    /// Dependency-first order; among independent services, lower priority first
    fn resolve_startup_order(
        &self,
        services: &[&'static str],
    ) -> Result<Vec<&'static str>, String> {
        fn visit(
            name: &'static str,
            services: &HashMap<&'static str, Box<dyn Service>>,
            ordered: &mut Vec<&'static str>,
            visited: &mut HashSet<&'static str>,
            visiting: &mut HashSet<&'static str>,
        ) -> Result<(), String> {
            if visited.contains(name) {
                return Ok(());
            }

            if visiting.contains(name) {
                return Err(format!(
                    "Circular dependency detected for service: {}",
                    name
                ));
            }

            visiting.insert(name);

            if let Some(service) = services.get(name) {
                for dep in service.dependencies() {
                    visit(dep, services, ordered, visited, visiting)?;
                }
            }

            visiting.remove(name);
            visited.insert(name);
            ordered.push(name);

            Ok(())
        }

        let mut by_priority = services.to_vec();
        by_priority.sort_by_key(|name| {
            (
                self.services.get(name).map(|s| s.priority()).unwrap_or(100),
                *name,
            )
        });

        let mut ordered = Vec::new();
        let mut visited = HashSet::new();
        let mut visiting = HashSet::new();
        for service_name in by_priority {
            visit(
                service_name,
                &self.services,
                &mut ordered,
                &mut visited,
                &mut visiting,
            )?;
        }

        Ok(ordered)
    }

    /// Get health status
    pub async fn get_health(&self) -> HashMap<&'static str, ServiceHealth> {
        let mut health = HashMap::new();
        for (name, service) in &self.services {
            health.insert(*name, service.health().await);
        }
        health
    }

    /// Get metrics
    pub async fn get_metrics(&self) -> HashMap<&'static str, ServiceMetrics> {
        let mut metrics = HashMap::new();
        for (name, service) in &self.services {
            let service_metrics = self
                .metrics_collector
                .collect_for_service(name, service.metrics().await);
            metrics.insert(*name, service_metrics);
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct RecordingService {
        name: &'static str,
        priority: i32,
        deps: Vec<&'static str>,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Service for RecordingService {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn dependencies(&self) -> Vec<&'static str> {
            self.deps.clone()
        }

        async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
            self.log.lock().push(format!("start:{}", self.name));
            let log = Arc::clone(&self.log);
            let name = self.name;
            let handle = tokio::spawn(async move {
                shutdown.notified().await;
                log.lock().push(format!("exit:{}", name));
            });
            Ok(vec![handle])
        }
    }

    fn service(
        name: &'static str,
        priority: i32,
        deps: Vec<&'static str>,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> Box<dyn Service> {
        Box::new(RecordingService {
            name,
            priority,
            deps,
            log: Arc::clone(log),
        })
    }

    #[tokio::test]
    async fn test_dependencies_start_first_and_tasks_stop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ServiceManager::new(Config::default());
        // webserver has the lower priority value but depends on pool_refresh
        manager.register(service("webserver", 10, vec!["pool_refresh"], &log));
        manager.register(service("pool_refresh", 50, vec![], &log));

        manager.start_all().await.unwrap();
        assert_eq!(
            log.lock().clone(),
            vec!["start:pool_refresh".to_string(), "start:webserver".to_string()]
        );

        let metrics = manager.get_metrics().await;
        assert_eq!(metrics["webserver"].task_count, 1);

        // let the spawned tasks reach their shutdown wait
        tokio::task::yield_now().await;
        manager.stop_all().await.unwrap();
        let entries = log.lock().clone();
        assert!(entries.contains(&"exit:pool_refresh".to_string()));
        assert!(entries.contains(&"exit:webserver".to_string()));
    }

    #[tokio::test]
    async fn test_circular_dependency_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ServiceManager::new(Config::default());
        manager.register(service("a", 1, vec!["b"], &log));
        manager.register(service("b", 1, vec!["a"], &log));

        let err = manager.start_all().await.unwrap_err();
        assert!(err.contains("Circular dependency"));
    }
}
