/// Query interface used by the webserver
///
/// Every call reads the store once and runs a pure projection over that
/// snapshot, so one response never mixes two refreshes.
use super::query::{lookup_by_exact_project, search_by_project, top_by_yield};
use super::store::{Snapshot, SnapshotStore};
use super::types::{PoolRecord, ProtocolYield};
use crate::config::NamedProtocol;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_TOP_COUNT: i64 = 5;

#[derive(Clone)]
pub struct YieldQueries {
    store: Arc<SnapshotStore>,
    named: Arc<Vec<NamedProtocol>>,
    default_count: i64,
}

impl YieldQueries {
    pub fn new(store: Arc<SnapshotStore>, named: Vec<NamedProtocol>, default_count: i64) -> Self {
        Self {
            store,
            named: Arc::new(named),
            default_count,
        }
    }

    /// Build with the named protocols and default count from the global configuration
    pub fn from_config(store: Arc<SnapshotStore>) -> Self {
        let (named, default_count) =
            crate::config::with_config(|cfg| (cfg.named.protocols.clone(), cfg.query.default_count));
        Self::new(store, named, default_count)
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.current()
    }

    pub fn get_top(&self, count: i64) -> Vec<ProtocolYield> {
        top_by_yield(&self.store.current(), count)
    }

    /// Every cached record, unfiltered
    pub fn all_pools(&self) -> Vec<PoolRecord> {
        self.store.current().records().to_vec()
    }

    pub fn search(&self, term: &str) -> Vec<ProtocolYield> {
        search_by_project(&self.store.current(), term)
    }

    /// `/api/protocols` semantics: a present, non-blank search term wins,
    /// otherwise top-N with the default count
    pub fn protocols(&self, search: Option<&str>, count: Option<i64>) -> Vec<ProtocolYield> {
        match search {
            Some(term) if !term.trim().is_empty() => self.search(term),
            _ => self.get_top(count.unwrap_or(self.default_count)),
        }
    }

    /// Effective yield per configured label; 0.0 for projects not in the snapshot
    pub fn get_named_apy(&self) -> BTreeMap<String, f64> {
        let snapshot = self.store.current();
        self.named
            .iter()
            .map(|protocol| {
                (
                    protocol.label.clone(),
                    lookup_by_exact_project(&snapshot, &protocol.project),
                )
            })
            .collect()
    }

    pub fn default_count(&self) -> i64 {
        self.default_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(project: &str, base: f64) -> PoolRecord {
        PoolRecord {
            project: project.to_string(),
            base_yield_pct: Some(base),
            ..Default::default()
        }
    }

    fn queries(store: Arc<SnapshotStore>) -> YieldQueries {
        YieldQueries::new(
            store,
            vec![
                NamedProtocol::new("Aave-V3", "aave-v3"),
                NamedProtocol::new("Binance Staked ETH", "binance-staked-eth"),
            ],
            DEFAULT_TOP_COUNT,
        )
    }

    fn populated() -> YieldQueries {
        let store = Arc::new(SnapshotStore::new());
        store.publish(
            (1..=8)
                .map(|i| record(&format!("proto-{}", i), i as f64))
                .chain(std::iter::once(record("Aave-V3", 4.7)))
                .collect(),
        );
        queries(store)
    }

    #[test]
    fn test_empty_store_defaults() {
        let q = queries(Arc::new(SnapshotStore::new()));
        assert!(q.get_top(5).is_empty());
        assert!(q.protocols(None, None).is_empty());

        let named = q.get_named_apy();
        assert_eq!(named.len(), 2);
        assert!(named.values().all(|apy| *apy == 0.0));
    }

    #[test]
    fn test_protocols_defaults_to_top_five() {
        let q = populated();
        let top = q.protocols(None, None);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].name, "proto-8");
    }

    #[test]
    fn test_protocols_blank_search_falls_back_to_count() {
        let q = populated();
        assert_eq!(q.protocols(Some("   "), Some(2)).len(), 2);
        assert_eq!(q.protocols(Some(""), Some(3)).len(), 3);
    }

    #[test]
    fn test_protocols_search_overrides_count() {
        let q = populated();
        let hits = q.protocols(Some("PROTO"), Some(1));
        assert_eq!(hits.len(), 8);
        assert_eq!(hits[0].apy, 8.0);
    }

    #[test]
    fn test_named_apy_matches_case_insensitively() {
        let named = populated().get_named_apy();
        assert_eq!(named["Aave-V3"], 4.7);
        assert_eq!(named["Binance Staked ETH"], 0.0);
    }
}
