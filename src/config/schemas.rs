/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides:
/// - Single-source definition (no repetition)
/// - Embedded defaults
/// - Serde support
use crate::apis::defillama::{DEFILLAMA_POOLS_URL, TIMEOUT_SECS};
use crate::config_struct;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// UPSTREAM FEED
// ============================================================================

config_struct! {
    /// Upstream yields feed
    pub struct UpstreamConfig {
        /// Pools endpoint returning either `[...]` or `{ "data": [...] }`
        url: String = DEFILLAMA_POOLS_URL.to_string(),

        /// Per-request timeout; must stay below refresh.interval_secs
        timeout_secs: u64 = TIMEOUT_SECS,

        user_agent: String = concat!("yieldwatch/", env!("CARGO_PKG_VERSION")).to_string(),
    }
}

// ============================================================================
// REFRESH LOOP
// ============================================================================

config_struct! {
    /// Background refresh cadence
    pub struct RefreshConfig {
        /// Periodic refresh toggle (the startup refresh always runs)
        enabled: bool = true,

        interval_secs: u64 = 30,
    }
}

// ============================================================================
// QUERIES
// ============================================================================

config_struct! {
    pub struct QueryConfig {
        /// Top-N size when the caller gives no count
        default_count: i64 = 5,
    }
}

/// A fixed protocol reported by the named APY lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedProtocol {
    /// Display label used as the key in the response
    pub label: String,
    /// Upstream `project` value, matched case-insensitively
    pub project: String,
}

impl NamedProtocol {
    pub fn new(label: &str, project: &str) -> Self {
        Self {
            label: label.to_string(),
            project: project.to_string(),
        }
    }
}

config_struct! {
    pub struct NamedConfig {
        protocols: Vec<NamedProtocol> = vec![
            NamedProtocol::new("Aave-V3", "aave-v3"),
            NamedProtocol::new("Binance Staked ETH", "binance-staked-eth"),
        ],
    }
}

// ============================================================================
// WEBSERVER
// ============================================================================

config_struct! {
    /// HTTP API configuration
    pub struct WebserverConfig {
        enabled: bool = true,
        host: String = "127.0.0.1".to_string(),
        port: u16 = 8080,
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration (one TOML table per section)
    pub struct Config {
        upstream: UpstreamConfig = UpstreamConfig::default(),
        refresh: RefreshConfig = RefreshConfig::default(),
        query: QueryConfig = QueryConfig::default(),
        named: NamedConfig = NamedConfig::default(),
        webserver: WebserverConfig = WebserverConfig::default(),
    }
}

impl Config {
    /// Check cross-field constraints that serde defaults cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.upstream.url.trim().is_empty() {
            return Err("upstream.url must not be empty".to_string());
        }
        if self.upstream.timeout_secs == 0 {
            return Err("upstream.timeout_secs must be greater than 0".to_string());
        }
        if self.refresh.interval_secs == 0 {
            return Err("refresh.interval_secs must be greater than 0".to_string());
        }
        if self.upstream.timeout_secs >= self.refresh.interval_secs {
            return Err(format!(
                "upstream.timeout_secs ({}) must be shorter than refresh.interval_secs ({})",
                self.upstream.timeout_secs, self.refresh.interval_secs
            ));
        }
        if self.webserver.port == 0 {
            return Err("webserver.port must be greater than 0".to_string());
        }

        let mut labels = HashSet::new();
        for protocol in &self.named.protocols {
            if protocol.project.trim().is_empty() {
                return Err(format!(
                    "named protocol '{}' has an empty project",
                    protocol.label
                ));
            }
            if !labels.insert(protocol.label.as_str()) {
                return Err(format!("duplicate named protocol label '{}'", protocol.label));
            }
        }

        Ok(())
    }
}
