//! Snapshot source trait.
//!
//! The orchestrator only depends on this trait, which allows:
//! - Unit testing cycles with scripted responses
//! - Swapping the HTTP client for another transport

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use pulse_core::{BoxFuture, EntityKey, EntitySnapshot, Interval};

use crate::client::{Fetched, MetricsClient};
use crate::error::{UpstreamError, UpstreamResult};

/// Anything that can produce one snapshot per entity key.
pub trait SnapshotSource: Send + Sync {
    /// Fetch a snapshot for `key`, starting with the `preferred` window.
    fn fetch<'a>(
        &'a self,
        key: &'a EntityKey,
        preferred: Interval,
    ) -> BoxFuture<'a, UpstreamResult<Fetched>>;
}

impl SnapshotSource for MetricsClient {
    fn fetch<'a>(
        &'a self,
        key: &'a EntityKey,
        preferred: Interval,
    ) -> BoxFuture<'a, UpstreamResult<Fetched>> {
        Box::pin(MetricsClient::fetch(self, key, preferred))
    }
}

/// Scripted response for [`MockSnapshotSource`].
#[derive(Debug, Clone)]
enum Scripted {
    Snapshot(EntitySnapshot, bool),
    Transport(String),
    NoData,
    Protocol(String),
}

/// Mock snapshot source for testing.
///
/// Responses are queued per key and consumed in order; the last queued
/// response for a key is repeated once the queue would run dry. Keys with
/// nothing queued fail with a transport error.
#[derive(Debug, Default)]
pub struct MockSnapshotSource {
    scripts: Mutex<HashMap<EntityKey, VecDeque<Scripted>>>,
    calls: Mutex<Vec<EntityKey>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful snapshot served from the preferred window.
    pub fn push_snapshot(&self, key: EntityKey, snapshot: EntitySnapshot) {
        self.push(key, Scripted::Snapshot(snapshot, false));
    }

    /// Queue a successful snapshot served from the alternate window.
    pub fn push_fallback_snapshot(&self, key: EntityKey, snapshot: EntitySnapshot) {
        self.push(key, Scripted::Snapshot(snapshot, true));
    }

    pub fn push_transport_error(&self, key: EntityKey, detail: impl Into<String>) {
        self.push(key, Scripted::Transport(detail.into()));
    }

    pub fn push_no_data(&self, key: EntityKey) {
        self.push(key, Scripted::NoData);
    }

    pub fn push_protocol_error(&self, key: EntityKey, detail: impl Into<String>) {
        self.push(key, Scripted::Protocol(detail.into()));
    }

    /// Keys fetched so far, in call order.
    pub fn calls(&self) -> Vec<EntityKey> {
        self.calls.lock().clone()
    }

    /// Highest number of fetches observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn push(&self, key: EntityKey, scripted: Scripted) {
        self.scripts.lock().entry(key).or_default().push_back(scripted);
    }

    fn next_for(&self, key: &EntityKey) -> Option<Scripted> {
        let mut scripts = self.scripts.lock();
        let queue = scripts.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl SnapshotSource for MockSnapshotSource {
    fn fetch<'a>(
        &'a self,
        key: &'a EntityKey,
        preferred: Interval,
    ) -> BoxFuture<'a, UpstreamResult<Fetched>> {
        Box::pin(async move {
            self.calls.lock().push(key.clone());
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            // Yield so overlapping fetches would be observable.
            tokio::task::yield_now().await;

            let result = match self.next_for(key) {
                Some(Scripted::Snapshot(snapshot, fell_back)) => Ok(Fetched {
                    snapshot,
                    interval: if fell_back {
                        preferred.alternate()
                    } else {
                        preferred
                    },
                    fell_back,
                }),
                Some(Scripted::Transport(detail)) => Err(UpstreamError::Transport {
                    key: key.to_string(),
                    detail,
                }),
                Some(Scripted::NoData) => Err(UpstreamError::NoData {
                    key: key.to_string(),
                    detail: format!(
                        "no interval data for {preferred} or {}",
                        preferred.alternate()
                    ),
                }),
                Some(Scripted::Protocol(detail)) => Err(UpstreamError::Protocol {
                    key: key.to_string(),
                    detail,
                }),
                None => Err(UpstreamError::Transport {
                    key: key.to_string(),
                    detail: "no scripted response".to_string(),
                }),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}
