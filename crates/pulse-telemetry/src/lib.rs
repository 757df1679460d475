//! Prometheus metrics and structured logging for agentpulse.
//!
//! - Prometheus metrics for cycles, signals, failures and advice
//! - Structured JSON logging with tracing
//! - Session statistics read back from the registry

pub mod cycle_stats;
pub mod error;
pub mod logging;
pub mod metrics;

pub use cycle_stats::{CycleStats, CycleStatsReporter};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with, DEFAULT_FILTER};
pub use metrics::{encode_text, Metrics};
