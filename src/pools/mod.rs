//! Pool snapshot subsystem
//!
//! - `types`: upstream wire format and normalized records
//! - `parser`: payload shape detection
//! - `store`: atomically swapped snapshot holder
//! - `query`: pure ranking / search / lookup projections
//! - `refresher`: fetch + publish, once or on a fixed period
//! - `service`: query interface consumed by the webserver

pub mod parser;
pub mod query;
pub mod refresher;
pub mod service;
pub mod store;
pub mod types;

pub use query::{lookup_by_exact_project, search_by_project, top_by_yield};
pub use refresher::{PoolSource, RefreshOutcome, RefreshStats, Refresher};
pub use service::{YieldQueries, DEFAULT_TOP_COUNT};
pub use store::{Snapshot, SnapshotStore};
pub use types::{PoolRecord, ProtocolYield};
