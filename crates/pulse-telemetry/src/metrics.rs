//! Prometheus metrics for agentpulse.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error that should crash
//! at startup. These panics only occur during static initialization.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_histogram, CounterVec,
    Encoder, Gauge, GaugeVec, Histogram, TextEncoder,
};

/// Completed cycles.
/// Labels: outcome (complete/partial/total_failure)
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pulse_cycles_total",
        "Completed orchestration cycles by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Wall-clock duration of one cycle in milliseconds.
pub static CYCLE_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "pulse_cycle_duration_ms",
        "Cycle duration in milliseconds",
        vec![100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0]
    )
    .unwrap()
});

/// Signals produced.
/// Labels: trend
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pulse_signals_total",
        "Signals produced by trend classification",
        &["trend"]
    )
    .unwrap()
});

/// Per-entity failures.
/// Labels: kind (transport/no_data/protocol)
pub static ENTITY_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pulse_entity_failures_total",
        "Per-entity fetch failures by kind",
        &["kind"]
    )
    .unwrap()
});

/// Lookups served from the alternate reporting window.
pub static INTERVAL_FALLBACK_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pulse_interval_fallback_total",
        "Lookups that fell back to the alternate interval",
        &["from", "to"]
    )
    .unwrap()
});

/// Mean sentiment of the last cycle. NaN when the cycle produced no signal.
pub static AGGREGATE_SENTIMENT: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "pulse_aggregate_sentiment",
        "Mean sentiment score of the last cycle"
    )
    .unwrap()
});

pub static ENTITY_SENTIMENT: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "pulse_entity_sentiment",
        "Last sentiment score per agent",
        &["agent"]
    )
    .unwrap()
});

pub static ENTITY_CONFIDENCE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "pulse_entity_confidence",
        "Last confidence per agent",
        &["agent"]
    )
    .unwrap()
});

/// Advice requests that fell back to the fixed note.
pub static ADVICE_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pulse_advice_failures_total",
        "Advice generation failures",
        &["reason"]
    )
    .unwrap()
});

/// Scheduler state (1 = active).
/// Labels: state (running/stopped)
pub static SCHEDULER_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "pulse_scheduler_state",
        "Scheduler state machine current state (1=active, 0=inactive)",
        &["state"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a finished cycle.
    pub fn cycle_completed(outcome: &str, duration_ms: f64) {
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
        CYCLE_DURATION_MS.observe(duration_ms);
    }

    /// Record one produced signal.
    pub fn signal_produced(agent: &str, trend: &str, sentiment: f64, confidence: f64) {
        SIGNALS_TOTAL.with_label_values(&[trend]).inc();
        ENTITY_SENTIMENT.with_label_values(&[agent]).set(sentiment);
        ENTITY_CONFIDENCE.with_label_values(&[agent]).set(confidence);
    }

    pub fn entity_failed(kind: &str) {
        ENTITY_FAILURES_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn interval_fallback(from: &str, to: &str) {
        INTERVAL_FALLBACK_TOTAL.with_label_values(&[from, to]).inc();
    }

    /// Set the aggregate gauge; `None` is exported as NaN, never 0.
    pub fn aggregate_sentiment(value: Option<f64>) {
        AGGREGATE_SENTIMENT.set(value.unwrap_or(f64::NAN));
    }

    pub fn advice_failed(reason: &str) {
        ADVICE_FAILURES_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Set scheduler state. Only the active state is 1.
    pub fn scheduler_state_set(state: &str) {
        for s in &["running", "stopped"] {
            SCHEDULER_STATE.with_label_values(&[s]).set(0.0);
        }
        SCHEDULER_STATE.with_label_values(&[state]).set(1.0);
    }
}

/// Render the default registry in the Prometheus text format.
pub fn encode_text() -> TelemetryResult<String> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_counter_increments() {
        let before = ENTITY_FAILURES_TOTAL.with_label_values(&["no_data"]).get();
        Metrics::entity_failed("no_data");
        let after = ENTITY_FAILURES_TOTAL.with_label_values(&["no_data"]).get();
        assert_eq!(after - before, 1.0);
    }

    #[test]
    fn test_scheduler_state_is_exclusive() {
        Metrics::scheduler_state_set("running");
        assert_eq!(SCHEDULER_STATE.with_label_values(&["running"]).get(), 1.0);
        assert_eq!(SCHEDULER_STATE.with_label_values(&["stopped"]).get(), 0.0);
    }

    #[test]
    fn test_encode_text_contains_metric() {
        Metrics::interval_fallback("_7Days", "_3Days");
        let text = encode_text().unwrap();
        assert!(text.contains("pulse_interval_fallback_total"));
    }
}
