/// Snapshot store
///
/// Holds the current immutable list of pool records behind an `ArcSwap`.
/// Readers take one reference (`current()`) and keep reading it for as long
/// as they like; a concurrent `replace` only affects later reads. Nothing is
/// ever mutated in place.
use super::types::PoolRecord;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Immutable point-in-time list of records
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    records: Vec<PoolRecord>,
    generation: u64,
    published_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The initial snapshot served before any refresh succeeds
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(records: Vec<PoolRecord>, generation: u64, published_at: DateTime<Utc>) -> Self {
        Self {
            records,
            generation,
            published_at: Some(published_at),
        }
    }

    pub fn records(&self) -> &[PoolRecord] {
        &self.records
    }

    /// 0 for the initial empty snapshot, then 1, 2, ... per publication
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
}

impl Deref for Snapshot {
    type Target = [PoolRecord];

    fn deref(&self) -> &[PoolRecord] {
        &self.records
    }
}

pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
    next_generation: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::empty()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Latest published snapshot; never blocks, never fails
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Install `snapshot` as current (last write wins)
    pub fn replace(&self, snapshot: Arc<Snapshot>) {
        self.current.store(snapshot);
    }

    /// Wrap `records` in a new snapshot with the next generation number and install it
    pub fn publish(&self, records: Vec<PoolRecord>) -> Arc<Snapshot> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let snapshot = Arc::new(Snapshot::new(records, generation, Utc::now()));
        self.replace(Arc::clone(&snapshot));
        snapshot
    }

    /// Number of records in the current snapshot
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once at least one refresh has been published
    pub fn has_published(&self) -> bool {
        self.current.load().published_at.is_some()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
