use std::collections::HashMap;
use std::time::Instant;

/// Service metrics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ServiceMetrics {
    pub uptime_seconds: u64,
    pub task_count: usize,
    /// Service-specific counters (e.g. refresh success/failure totals)
    pub custom_metrics: HashMap<String, f64>,
}

/// Tracks per-service start times and merges them into reported metrics
pub struct MetricsCollector {
    service_start_times: HashMap<&'static str, Instant>,
    task_counts: HashMap<&'static str, usize>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            service_start_times: HashMap::new(),
            task_counts: HashMap::new(),
        }
    }

    /// Start monitoring a service
    pub fn start_monitoring(&mut self, service_name: &'static str, task_count: usize) {
        self.service_start_times.insert(service_name, Instant::now());
        self.task_counts.insert(service_name, task_count);
    }

    pub fn stop_monitoring(&mut self, service_name: &'static str) {
        self.service_start_times.remove(service_name);
        self.task_counts.remove(service_name);
    }

    /// Fill in the collector-owned fields of `metrics`
    pub fn collect_for_service(&self, name: &str, mut metrics: ServiceMetrics) -> ServiceMetrics {
        metrics.uptime_seconds = self
            .service_start_times
            .get(name)
            .map(|start| start.elapsed().as_secs())
            .unwrap_or(0);
        metrics.task_count = self.task_counts.get(name).copied().unwrap_or(0);
        metrics
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
