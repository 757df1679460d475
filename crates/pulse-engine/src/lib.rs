//! Cycle engine for agentpulse.
//!
//! - `HistoryStore`: bounded per-entity snapshot history
//! - `CycleOrchestrator`: one pass over the roster producing a `CycleResult`
//! - `Scheduler`: drives the orchestrator on a fixed interval until cancelled

pub mod config;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod scheduler;

pub use config::{HistoryConfig, SchedulerConfig};
pub use error::{EngineError, EngineResult};
pub use history::{HistoryStore, DEFAULT_HISTORY_CAPACITY};
pub use orchestrator::CycleOrchestrator;
pub use scheduler::{cycle_outcome, CycleSink, MockCycleSink, Scheduler, SchedulerState};
