//! Bounded per-entity snapshot history.

use dashmap::DashMap;
use pulse_core::{EntityKey, EntitySnapshot};
use std::collections::VecDeque;

/// Snapshots retained per entity unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Per-entity FIFO of snapshots, oldest first.
///
/// Appends to one key are serialized by the map's shard lock; different
/// keys never contend beyond sharing a shard.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    series: DashMap<EntityKey, VecDeque<EntitySnapshot>>,
}

impl HistoryStore {
    /// Create a store keeping at most `capacity` snapshots per entity.
    ///
    /// A capacity of 0 is raised to 1; configuration rejects it earlier.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: DashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a snapshot, evicting the oldest one at capacity.
    pub fn record(&self, key: &EntityKey, snapshot: EntitySnapshot) {
        let mut series = self
            .series
            .entry(key.clone())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        while series.len() >= self.capacity {
            series.pop_front();
        }
        series.push_back(snapshot);
    }

    /// Copy of the series for `key`, oldest first. Empty if never recorded.
    pub fn series(&self, key: &EntityKey) -> Vec<EntitySnapshot> {
        self.series
            .get(key)
            .map(|series| series.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, key: &EntityKey) -> usize {
        self.series.get(key).map(|series| series.len()).unwrap_or(0)
    }

    pub fn latest(&self, key: &EntityKey) -> Option<EntitySnapshot> {
        self.series.get(key).and_then(|series| series.back().cloned())
    }

    /// Keys with at least one snapshot, in no particular order.
    pub fn tracked_entities(&self) -> Vec<EntityKey> {
        self.series.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
