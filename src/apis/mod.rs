/// API clients for external data sources
pub mod client;
pub mod defillama;
pub mod stats;

pub use client::HttpClient;
pub use defillama::DefiLlamaClient;
pub use stats::{ApiStats, ApiStatsTracker};
