use crate::config::Config;
use crate::logger::{self, LogTag};
use crate::services::{Service, ServiceHealth};
use crate::webserver::{self, AppState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Serves the HTTP API once the first pool refresh has been attempted
pub struct WebserverService {
    state: Arc<AppState>,
    host: String,
    port: u16,
    listener: Option<TcpListener>,
}

impl WebserverService {
    pub fn new(state: Arc<AppState>, host: &str, port: u16) -> Self {
        Self {
            state,
            host: host.to_string(),
            port,
            listener: None,
        }
    }

    pub fn from_config(state: Arc<AppState>) -> Self {
        let cfg = crate::config::with_config(|cfg| cfg.webserver.clone());
        Self::new(state, &cfg.host, cfg.port)
    }
}

#[async_trait]
impl Service for WebserverService {
    fn name(&self) -> &'static str {
        "webserver"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["pool_refresh"]
    }

    fn is_enabled(&self, config: &Config) -> bool {
        config.webserver.enabled
    }

    /// Bind early so a taken port fails startup instead of a background task
    async fn initialize(&mut self) -> Result<(), String> {
        let listener = webserver::bind(&self.host, self.port).await?;
        self.listener = Some(listener);
        Ok(())
    }

    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| "Webserver not initialized".to_string())?;
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            if let Err(e) = webserver::serve(listener, state, shutdown).await {
                logger::error(LogTag::Webserver, &format!("Webserver failed: {}", e));
            }
        });

        Ok(vec![handle])
    }

    async fn health(&self) -> ServiceHealth {
        ServiceHealth::Healthy
    }
}
