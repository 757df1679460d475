//! Session statistics read back from the metrics registry.
//!
//! Logged once by the scheduler when it stops:
//! - cycles run, split by outcome
//! - success rate (cycles that produced at least one signal)
//! - mean cycle duration
//! - failures by kind

use crate::metrics::{CYCLES_TOTAL, CYCLE_DURATION_MS, ENTITY_FAILURES_TOTAL, SIGNALS_TOTAL};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

const OUTCOMES: [&str; 3] = ["complete", "partial", "total_failure"];
const FAILURE_KINDS: [&str; 3] = ["transport", "no_data", "protocol"];
const TRENDS: [&str; 5] = ["STRONG_BUY", "BUY", "NEUTRAL", "SELL", "STRONG_SELL"];

/// Counters accumulated since the reporter was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleStats {
    pub cycles_total: u64,
    pub complete_cycles: u64,
    pub partial_cycles: u64,
    pub total_failure_cycles: u64,
    /// Share of cycles with at least one signal, in [0, 1].
    pub success_rate: f64,
    pub mean_cycle_ms: f64,
    pub signals_total: u64,
    pub failures_by_kind: BTreeMap<String, u64>,
}

/// Session statistics reporter.
///
/// The registry is process-global, so the reporter snapshots the
/// counters at creation and reports deltas from that baseline.
pub struct CycleStatsReporter {
    start_time: DateTime<Utc>,
    baseline: CycleStats,
    baseline_duration_sum: f64,
    summaries: AtomicU64,
}

impl CycleStatsReporter {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            baseline: read_raw(),
            baseline_duration_sum: CYCLE_DURATION_MS.get_sample_sum(),
            summaries: AtomicU64::new(0),
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Number of summaries logged so far.
    pub fn summaries_output(&self) -> u64 {
        self.summaries.load(Ordering::Relaxed)
    }

    /// Statistics since the reporter was created.
    pub fn get_stats(&self) -> CycleStats {
        let raw = read_raw();
        let base = &self.baseline;

        let complete_cycles = raw.complete_cycles.saturating_sub(base.complete_cycles);
        let partial_cycles = raw.partial_cycles.saturating_sub(base.partial_cycles);
        let total_failure_cycles = raw
            .total_failure_cycles
            .saturating_sub(base.total_failure_cycles);
        let cycles_total = complete_cycles + partial_cycles + total_failure_cycles;

        let success_rate = if cycles_total > 0 {
            (complete_cycles + partial_cycles) as f64 / cycles_total as f64
        } else {
            0.0
        };

        let observed = CYCLE_DURATION_MS
            .get_sample_count()
            .saturating_sub(base.cycles_total);
        let mean_cycle_ms = if observed > 0 {
            (CYCLE_DURATION_MS.get_sample_sum() - self.baseline_duration_sum) / observed as f64
        } else {
            0.0
        };

        let failures_by_kind = raw
            .failures_by_kind
            .iter()
            .map(|(kind, count)| {
                let before = base.failures_by_kind.get(kind).copied().unwrap_or(0);
                (kind.clone(), count.saturating_sub(before))
            })
            .collect();

        CycleStats {
            cycles_total,
            complete_cycles,
            partial_cycles,
            total_failure_cycles,
            success_rate,
            mean_cycle_ms,
            signals_total: raw.signals_total.saturating_sub(base.signals_total),
            failures_by_kind,
        }
    }

    /// Output session statistics to logs.
    pub fn output_summary(&self) {
        self.summaries.fetch_add(1, Ordering::Relaxed);
        let stats = self.get_stats();
        let duration = Utc::now() - self.start_time;

        info!(
            since = %self.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            uptime_minutes = duration.num_minutes(),
            cycles = stats.cycles_total,
            partial = stats.partial_cycles,
            total_failures = stats.total_failure_cycles,
            success_rate = format!("{:.1}%", stats.success_rate * 100.0),
            mean_cycle_ms = format!("{:.0}", stats.mean_cycle_ms),
            signals = stats.signals_total,
            "Session statistics"
        );
        for (kind, count) in &stats.failures_by_kind {
            if *count > 0 {
                info!(kind = %kind, count, "  Entity failures");
            }
        }
    }
}

impl Default for CycleStatsReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute counter values. `cycles_total` holds the histogram sample count.
fn read_raw() -> CycleStats {
    let count = |vec: &prometheus::CounterVec, label: &str| {
        vec.with_label_values(&[label]).get() as u64
    };

    CycleStats {
        cycles_total: CYCLE_DURATION_MS.get_sample_count(),
        complete_cycles: count(&CYCLES_TOTAL, OUTCOMES[0]),
        partial_cycles: count(&CYCLES_TOTAL, OUTCOMES[1]),
        total_failure_cycles: count(&CYCLES_TOTAL, OUTCOMES[2]),
        success_rate: 0.0,
        mean_cycle_ms: 0.0,
        signals_total: TRENDS.iter().map(|t| count(&SIGNALS_TOTAL, t)).sum(),
        failures_by_kind: FAILURE_KINDS
            .iter()
            .map(|k| (k.to_string(), count(&ENTITY_FAILURES_TOTAL, k)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_cycles_since_creation() {
        let reporter = CycleStatsReporter::new();
        crate::Metrics::cycle_completed("partial", 120.0);
        crate::Metrics::cycle_completed("total_failure", 80.0);

        let stats = reporter.get_stats();
        // Other tests may record concurrently; only lower bounds hold.
        assert!(stats.partial_cycles >= 1);
        assert!(stats.total_failure_cycles >= 1);
        assert!(stats.cycles_total >= 2);
        assert!(stats.success_rate < 1.0);
    }

    #[test]
    fn test_summary_count() {
        let reporter = CycleStatsReporter::new();
        assert_eq!(reporter.summaries_output(), 0);
        reporter.output_summary();
        assert_eq!(reporter.summaries_output(), 1);
    }
}
