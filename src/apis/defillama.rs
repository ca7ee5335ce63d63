/// DefiLlama yields API client
use super::client::HttpClient;
use super::stats::{ApiStats, ApiStatsTracker};
use crate::errors::{NetworkError, YieldWatchError, YieldWatchResult};
use crate::logger::{self, LogTag};
use crate::pools::parser::parse_pools_payload;
use crate::pools::refresher::PoolSource;
use crate::pools::types::PoolRecord;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Default pools endpoint, used by `[upstream] url`
pub const DEFILLAMA_POOLS_URL: &str = "https://yields.llama.fi/pools";
/// Default request timeout, used by `[upstream] timeout_secs`
pub const TIMEOUT_SECS: u64 = 10;

pub struct DefiLlamaClient {
    http_client: HttpClient,
    pools_url: String,
    stats: Arc<ApiStatsTracker>,
}

impl DefiLlamaClient {
    pub fn new(pools_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, String> {
        let http_client = HttpClient::new(timeout_secs, user_agent)?;

        Ok(Self {
            http_client,
            pools_url: pools_url.to_string(),
            stats: Arc::new(ApiStatsTracker::new()),
        })
    }

    /// Build from the global configuration
    pub fn from_config() -> Result<Self, String> {
        let upstream = crate::config::with_config(|cfg| cfg.upstream.clone());
        Self::new(&upstream.url, upstream.timeout_secs, &upstream.user_agent)
    }

    pub fn pools_url(&self) -> &str {
        &self.pools_url
    }

    pub async fn get_stats(&self) -> ApiStats {
        self.stats.get_stats().await
    }

    /// GET the pools endpoint and return the raw body
    async fn fetch_pools_body(&self) -> YieldWatchResult<String> {
        let start = Instant::now();

        logger::debug(LogTag::Api, &format!("GET {}", self.pools_url));

        let response = match self.http_client.client().get(&self.pools_url).send().await {
            Ok(response) => response,
            Err(e) => {
                self.stats
                    .record_request(false, start.elapsed().as_millis() as f64)
                    .await;
                return Err(self.map_request_error(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.stats
                .record_request(false, start.elapsed().as_millis() as f64)
                .await;
            return Err(NetworkError::HttpStatusError {
                endpoint: self.pools_url.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                self.stats
                    .record_request(false, start.elapsed().as_millis() as f64)
                    .await;
                return Err(self.map_request_error(e));
            }
        };

        let elapsed = start.elapsed().as_millis() as f64;
        self.stats.record_request(true, elapsed).await;

        logger::debug(
            LogTag::Api,
            &format!(
                "DefiLlama responded {} ({} bytes) in {:.0}ms",
                status,
                body.len(),
                elapsed
            ),
        );

        Ok(body)
    }

    fn map_request_error(&self, error: reqwest::Error) -> YieldWatchError {
        if error.is_timeout() {
            NetworkError::ConnectionTimeout {
                endpoint: self.pools_url.clone(),
                timeout_ms: self.http_client.timeout().as_millis() as u64,
            }
            .into()
        } else {
            NetworkError::RequestFailed {
                endpoint: self.pools_url.clone(),
                message: error.to_string(),
            }
            .into()
        }
    }
}

#[async_trait]
impl PoolSource for DefiLlamaClient {
    fn name(&self) -> &str {
        "defillama"
    }

    async fn fetch_pools(&self) -> YieldWatchResult<Vec<PoolRecord>> {
        let body = self.fetch_pools_body().await?;
        Ok(parse_pools_payload(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_url_and_timeout() {
        let client = DefiLlamaClient::new(DEFILLAMA_POOLS_URL, TIMEOUT_SECS, "yieldwatch-test").unwrap();
        assert_eq!(client.pools_url(), DEFILLAMA_POOLS_URL);
        assert_eq!(client.http_client.timeout().as_secs(), TIMEOUT_SECS);
        assert_eq!(client.name(), "defillama");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        // port 9 (discard) on localhost is not expected to serve HTTP
        let client = DefiLlamaClient::new("http://127.0.0.1:9/pools", 2, "yieldwatch-test").unwrap();
        let err = client.fetch_pools().await.unwrap_err();
        assert!(err.is_transient());

        let stats = client.get_stats().await;
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
    }
}
