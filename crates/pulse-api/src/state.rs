//! Shared state between the scheduler and the HTTP handlers.

use crate::types::{AnalysisResponse, ErrorResponse, HealthResponse, Published};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Latest published cycle outcome.
///
/// Written once per cycle, read by every request. Cloning shares the
/// underlying state.
#[derive(Clone)]
pub struct ApiState {
    latest: Arc<RwLock<Option<Published>>>,
    last_cycle_at: Arc<RwLock<Option<DateTime<Utc>>>>,
    published: Arc<AtomicU64>,
    started_at: DateTime<Utc>,
}

impl ApiState {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(RwLock::new(None)),
            last_cycle_at: Arc::new(RwLock::new(None)),
            published: Arc::new(AtomicU64::new(0)),
            started_at: Utc::now(),
        }
    }

    pub fn publish_analysis(&self, response: AnalysisResponse) {
        let at = response.timestamp;
        self.store(Published::Analysis(response), at);
    }

    pub fn publish_failure(&self, response: ErrorResponse, at: DateTime<Utc>) {
        self.store(Published::Failure(response), at);
    }

    fn store(&self, published: Published, at: DateTime<Utc>) {
        *self.latest.write() = Some(published);
        *self.last_cycle_at.write() = Some(at);
        self.published.fetch_add(1, Ordering::SeqCst);
    }

    /// `None` until the first cycle has been published.
    pub fn latest(&self) -> Option<Published> {
        self.latest.read().clone()
    }

    pub fn cycles_published(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }

    pub fn health(&self) -> HealthResponse {
        let last_cycle_at = *self.last_cycle_at.read();
        HealthResponse {
            status: if last_cycle_at.is_some() { "ok" } else { "starting" }.to_string(),
            cycles_published: self.cycles_published(),
            last_cycle_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds(),
        }
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new()
    }
}
