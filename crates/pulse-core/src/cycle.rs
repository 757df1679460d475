//! Cycle output types.
//!
//! A `CycleResult` is built once per roster pass, handed to the reporting
//! and response layers, and then dropped. Construction ranks the signals
//! and computes the aggregate sentiment so every consumer sees the same
//! ordering.

use crate::signal::MarketSignal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an entity produced no signal this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network or HTTP failure unrelated to data availability.
    Transport,
    /// Neither reporting window had data.
    NoData,
    /// Success envelope was malformed.
    Protocol,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::NoData => "no_data",
            Self::Protocol => "protocol",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-entity failure recorded during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFailure {
    /// Roster key of the entity (handle or contract address).
    pub entity: String,
    pub kind: FailureKind,
    pub detail: String,
}

impl EntityFailure {
    pub fn new(entity: impl Into<String>, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            kind,
            detail: detail.into(),
        }
    }

    /// Warning string published alongside the signals.
    pub fn warning(&self) -> String {
        format!("Failed to fetch data for {}: {}", self.entity, self.detail)
    }
}

impl fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.entity, self.kind, self.detail)
    }
}

/// Output of one orchestration pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResult {
    /// Sequence number, starting at 1.
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Signals ranked by confidence, highest first.
    pub signals: Vec<MarketSignal>,
    pub failures: Vec<EntityFailure>,
    /// Mean sentiment of `signals`; `None` when no signal was produced.
    pub aggregate_sentiment: Option<f64>,
}

impl CycleResult {
    /// Build a result from signals in roster order.
    ///
    /// Signals are stable-sorted by confidence descending, so equal
    /// confidences keep roster order.
    pub fn new(
        cycle: u64,
        started_at: DateTime<Utc>,
        mut signals: Vec<MarketSignal>,
        failures: Vec<EntityFailure>,
    ) -> Self {
        signals.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let aggregate_sentiment = aggregate_sentiment(&signals);

        Self {
            cycle,
            started_at,
            finished_at: Utc::now(),
            signals,
            failures,
            aggregate_sentiment,
        }
    }

    /// True when every entity failed. Reported as a whole-cycle error.
    pub fn is_total_failure(&self) -> bool {
        self.signals.is_empty()
    }

    /// True when some, but not all, entities failed.
    pub fn is_partial(&self) -> bool {
        !self.signals.is_empty() && !self.failures.is_empty()
    }

    /// One warning string per failed entity.
    pub fn warnings(&self) -> Vec<String> {
        self.failures.iter().map(EntityFailure::warning).collect()
    }

    /// Number of roster entries attempted.
    pub fn attempted(&self) -> usize {
        self.signals.len() + self.failures.len()
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Arithmetic mean of sentiment scores, `None` for an empty slice.
pub fn aggregate_sentiment(signals: &[MarketSignal]) -> Option<f64> {
    if signals.is_empty() {
        return None;
    }
    let sum: f64 = signals.iter().map(|s| s.sentiment_score).sum();
    Some(sum / signals.len() as f64)
}
