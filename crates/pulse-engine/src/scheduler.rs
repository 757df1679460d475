//! Fixed-interval cycle scheduler.
//!
//! State machine with two states:
//! - RUNNING: run a cycle, report it, hand it to every sink, sleep, repeat
//! - STOPPED: entered only through the cancellation token
//!
//! Cancellation is observed while sleeping, never during a cycle, so the
//! in-flight cycle always completes and is published before stopping.

use crate::orchestrator::CycleOrchestrator;
use parking_lot::Mutex;
use pulse_core::{BoxFuture, CycleResult};
use pulse_telemetry::{CycleStatsReporter, Metrics};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopped,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

/// Consumer of finished cycles (response surface, advice, ...).
pub trait CycleSink: Send + Sync {
    fn publish<'a>(&'a self, result: &'a CycleResult) -> BoxFuture<'a, ()>;
}

/// Sink that keeps every published cycle, for tests.
#[derive(Debug, Default)]
pub struct MockCycleSink {
    published: Mutex<Vec<CycleResult>>,
}

impl MockCycleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<CycleResult> {
        self.published.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.published.lock().len()
    }
}

impl CycleSink for MockCycleSink {
    fn publish<'a>(&'a self, result: &'a CycleResult) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.published.lock().push(result.clone());
        })
    }
}

/// Outcome label used for logging and metrics.
pub fn cycle_outcome(result: &CycleResult) -> &'static str {
    if result.is_total_failure() {
        "total_failure"
    } else if result.is_partial() {
        "partial"
    } else {
        "complete"
    }
}

pub struct Scheduler {
    orchestrator: Arc<CycleOrchestrator>,
    interval: Duration,
    sinks: Vec<Arc<dyn CycleSink>>,
    shutdown: CancellationToken,
    state_tx: watch::Sender<SchedulerState>,
    stats: CycleStatsReporter,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<CycleOrchestrator>, interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(SchedulerState::Stopped);
        Self {
            orchestrator,
            interval,
            sinks: Vec::new(),
            shutdown: CancellationToken::new(),
            state_tx,
            stats: CycleStatsReporter::new(),
        }
    }

    /// Add a sink receiving every finished cycle, in registration order.
    pub fn with_sink(mut self, sink: Arc<dyn CycleSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Request a stop. Takes effect at the next sleep boundary.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state_tx.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Session statistics since the scheduler was created.
    pub fn stats(&self) -> &CycleStatsReporter {
        &self.stats
    }

    /// Run exactly one cycle, report it and publish it to every sink.
    pub async fn run_once(&self) -> CycleResult {
        let result = self.orchestrator.run_cycle().await;
        self.report(&result);
        for sink in &self.sinks {
            sink.publish(&result).await;
        }
        result
    }

    /// Run cycles until the shutdown token is cancelled.
    pub async fn run(&self) {
        if self.shutdown.is_cancelled() {
            info!("Shutdown already requested, scheduler not started");
            return;
        }

        self.set_state(SchedulerState::Running);
        info!(
            interval_secs = self.interval.as_secs(),
            roster = self.orchestrator.roster().len(),
            "Scheduler started"
        );

        loop {
            self.run_once().await;

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = self.shutdown.cancelled() => {
                    info!("Shutdown requested, stopping scheduler");
                    break;
                }
            }
        }

        self.set_state(SchedulerState::Stopped);
        self.stats.output_summary();
    }

    fn set_state(&self, state: SchedulerState) {
        self.state_tx.send_replace(state);
        Metrics::scheduler_state_set(state.as_str());
    }

    fn report(&self, result: &CycleResult) {
        let outcome = cycle_outcome(result);
        let aggregate = result
            .aggregate_sentiment
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "absent".to_string());

        Metrics::cycle_completed(outcome, result.elapsed_ms() as f64);
        Metrics::aggregate_sentiment(result.aggregate_sentiment);

        if result.is_total_failure() {
            error!(
                cycle = result.cycle,
                failures = result.failures.len(),
                elapsed_ms = result.elapsed_ms(),
                "Cycle produced no signals"
            );
        } else {
            info!(
                cycle = result.cycle,
                outcome,
                signals = result.signals.len(),
                failures = result.failures.len(),
                aggregate_sentiment = %aggregate,
                elapsed_ms = result.elapsed_ms(),
                "Cycle complete"
            );
        }

        for (rank, signal) in result.signals.iter().enumerate() {
            info!(rank = rank + 1, "{}", signal.summary_line());
        }
        for warning in result.warnings() {
            warn!(cycle = result.cycle, "{warning}");
        }
    }
}
