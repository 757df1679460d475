//! Cycle orchestrator.
//!
//! One pass over the roster: fetch, record, score. Entities are handled
//! one at a time in roster order and a failing entity never aborts the
//! pass. The whole pass only fails when the orchestrator itself is
//! misconfigured, which is rejected at construction.

use crate::error::{EngineError, EngineResult};
use crate::history::HistoryStore;
use chrono::Utc;
use pulse_core::{CycleResult, EntityFailure, EntityKey, EntitySnapshot, Interval, MarketSignal};
use pulse_signal::SignalEngine;
use pulse_telemetry::Metrics;
use pulse_upstream::SnapshotSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CycleOrchestrator {
    source: Arc<dyn SnapshotSource>,
    roster: Vec<EntityKey>,
    preferred_interval: Interval,
    engine: SignalEngine,
    history: Arc<HistoryStore>,
    cycles: AtomicU64,
}

impl CycleOrchestrator {
    /// Create an orchestrator over `roster`.
    ///
    /// Fails with `ConfigError` for an empty roster or an invalid key.
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        roster: Vec<EntityKey>,
        preferred_interval: Interval,
        engine: SignalEngine,
        history: Arc<HistoryStore>,
    ) -> EngineResult<Self> {
        if roster.is_empty() {
            return Err(EngineError::ConfigError("roster is empty".to_string()));
        }
        for key in &roster {
            key.validate()
                .map_err(|e| EngineError::ConfigError(format!("roster entry {key:?}: {e}")))?;
        }

        Ok(Self {
            source,
            roster,
            preferred_interval,
            engine,
            history,
            cycles: AtomicU64::new(0),
        })
    }

    pub fn roster(&self) -> &[EntityKey] {
        &self.roster
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Number of cycles run so far.
    pub fn cycles_run(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Run one pass over the roster.
    ///
    /// Returns only after every fetch of the pass has settled.
    pub async fn run_cycle(&self) -> CycleResult {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Utc::now();
        let mut signals = Vec::with_capacity(self.roster.len());
        let mut failures = Vec::new();

        for key in &self.roster {
            match self.source.fetch(key, self.preferred_interval).await {
                Ok(fetched) => {
                    if fetched.fell_back {
                        Metrics::interval_fallback(
                            self.preferred_interval.as_query(),
                            fetched.interval.as_query(),
                        );
                    }
                    let signal = self.evaluate(key, &fetched.snapshot);
                    self.history.record(key, fetched.snapshot);
                    debug!(
                        cycle,
                        %key,
                        interval = %fetched.interval,
                        score = signal.sentiment_score,
                        trend = %signal.market_trend,
                        "Entity scored"
                    );
                    Metrics::signal_produced(
                        &signal.agent_name,
                        signal.market_trend.as_str(),
                        signal.sentiment_score,
                        signal.confidence,
                    );
                    signals.push(signal);
                }
                Err(e) => {
                    let failure: EntityFailure = e.to_entity_failure(key.value());
                    warn!(
                        cycle,
                        %key,
                        kind = %failure.kind,
                        detail = %failure.detail,
                        "Entity fetch failed"
                    );
                    Metrics::entity_failed(failure.kind.as_str());
                    failures.push(failure);
                }
            }
        }

        CycleResult::new(cycle, started_at, signals, failures)
    }

    /// Score a snapshot, naming the signal after the key when the
    /// upstream omitted the agent name.
    fn evaluate(&self, key: &EntityKey, snapshot: &EntitySnapshot) -> MarketSignal {
        let mut signal = self.engine.evaluate(snapshot);
        if signal.agent_name.trim().is_empty() {
            signal.agent_name = key.value().to_string();
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::FailureKind;
    use pulse_upstream::MockSnapshotSource;

    /// Snapshot whose confidence equals `confidence` via the engagement ratio
    /// (liquidity contributes nothing).
    fn snapshot(name: &str, mindshare_delta: f64, confidence: f64) -> EntitySnapshot {
        EntitySnapshot {
            agent_name: name.to_string(),
            mindshare_delta_percent: mindshare_delta,
            average_engagements_count: confidence * 2.0,
            followers_count: 100.0,
            ..Default::default()
        }
    }

    fn orchestrator(mock: Arc<MockSnapshotSource>, roster: Vec<EntityKey>) -> CycleOrchestrator {
        tokio_test::assert_ok!(CycleOrchestrator::new(
            mock,
            roster,
            Interval::SevenDays,
            SignalEngine::default(),
            Arc::new(HistoryStore::default()),
        ))
    }

    #[test]
    fn test_empty_roster_is_config_error() {
        let result = CycleOrchestrator::new(
            Arc::new(MockSnapshotSource::new()),
            Vec::new(),
            Interval::SevenDays,
            SignalEngine::default(),
            Arc::new(HistoryStore::default()),
        );
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_blank_roster_key_is_config_error() {
        let result = CycleOrchestrator::new(
            Arc::new(MockSnapshotSource::new()),
            vec![EntityKey::twitter("ok"), EntityKey::twitter("  ")],
            Interval::SevenDays,
            SignalEngine::default(),
            Arc::new(HistoryStore::default()),
        );
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let mock = Arc::new(MockSnapshotSource::new());
        let roster: Vec<EntityKey> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|h| EntityKey::twitter(*h))
            .collect();

        mock.push_snapshot(roster[0].clone(), snapshot("A", 10.0, 20.0));
        mock.push_no_data(roster[1].clone());
        mock.push_snapshot(roster[2].clone(), snapshot("C", 40.0, 80.0));
        mock.push_snapshot(roster[3].clone(), snapshot("D", -20.0, 50.0));
        mock.push_no_data(roster[4].clone());
        mock.push_snapshot(roster[5].clone(), snapshot("F", 0.0, 65.0));

        let orchestrator = orchestrator(mock.clone(), roster.clone());
        let result = orchestrator.run_cycle().await;

        let names: Vec<_> = result.signals.iter().map(|s| s.agent_name.as_str()).collect();
        assert_eq!(names, vec!["C", "F", "D", "A"]);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures.iter().all(|f| f.kind == FailureKind::NoData));
        assert_eq!(result.warnings().len(), 2);
        assert!(result.warnings()[0].starts_with("Failed to fetch data for b:"));
        assert!(result.is_partial());

        // Sequential, roster order, one call per entity.
        assert_eq!(mock.calls(), roster);
        assert_eq!(mock.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_has_no_aggregate() {
        let mock = Arc::new(MockSnapshotSource::new());
        let roster = vec![EntityKey::twitter("a"), EntityKey::contract("0xb")];
        mock.push_transport_error(roster[0].clone(), "HTTP 500: boom");
        mock.push_protocol_error(roster[1].clone(), "success flag false");

        let result = orchestrator(mock, roster).run_cycle().await;
        assert!(result.is_total_failure());
        assert_eq!(result.aggregate_sentiment, None);
        assert_eq!(result.failures[0].kind, FailureKind::Transport);
        assert_eq!(result.failures[1].kind, FailureKind::Protocol);
        assert_eq!(result.failures[1].entity, "0xb");
    }

    #[tokio::test]
    async fn test_successes_recorded_in_history() {
        let mock = Arc::new(MockSnapshotSource::new());
        let key = EntityKey::twitter("a");
        mock.push_snapshot(key.clone(), snapshot("A", 1.0, 1.0));
        let orchestrator = orchestrator(mock, vec![key.clone()]);

        for _ in 0..3 {
            orchestrator.run_cycle().await;
        }
        assert_eq!(orchestrator.history().len(&key), 3);
        assert_eq!(orchestrator.cycles_run(), 3);
    }

    #[tokio::test]
    async fn test_failures_not_recorded_in_history() {
        let mock = Arc::new(MockSnapshotSource::new());
        let key = EntityKey::twitter("a");
        mock.push_no_data(key.clone());
        let orchestrator = orchestrator(mock, vec![key.clone()]);
        orchestrator.run_cycle().await;
        assert_eq!(orchestrator.history().len(&key), 0);
    }

    #[tokio::test]
    async fn test_cycle_numbers_increase() {
        let mock = Arc::new(MockSnapshotSource::new());
        let key = EntityKey::twitter("a");
        mock.push_snapshot(key.clone(), snapshot("A", 1.0, 1.0));
        let orchestrator = orchestrator(mock, vec![key]);

        assert_eq!(orchestrator.run_cycle().await.cycle, 1);
        assert_eq!(orchestrator.run_cycle().await.cycle, 2);
    }

    #[tokio::test]
    async fn test_blank_agent_name_uses_key() {
        let mock = Arc::new(MockSnapshotSource::new());
        let key = EntityKey::twitter("reika_ai_");
        mock.push_snapshot(key.clone(), snapshot("", 0.0, 0.0));
        let result = orchestrator(mock, vec![key]).run_cycle().await;
        assert_eq!(result.signals[0].agent_name, "reika_ai_");
    }

    #[tokio::test]
    async fn test_fallback_snapshot_still_scores() {
        let mock = Arc::new(MockSnapshotSource::new());
        let key = EntityKey::twitter("a");
        mock.push_fallback_snapshot(key.clone(), snapshot("A", 80.0, 10.0));
        let result = orchestrator(mock, vec![key]).run_cycle().await;
        assert_eq!(result.signals.len(), 1);
        assert!(result.failures.is_empty());
    }
}
