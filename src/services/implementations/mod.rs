mod pool_refresh_service;
#[cfg(feature = "web")]
mod webserver_service;

pub use pool_refresh_service::{refresh_health, PoolRefreshService};
#[cfg(feature = "web")]
pub use webserver_service::WebserverService;
