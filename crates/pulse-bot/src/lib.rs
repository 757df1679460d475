//! agentpulse.
//!
//! Periodically pulls public metrics for a roster of AI agents, scores
//! each one into a market signal and serves the ranked result:
//! - Upstream metrics fetch with interval fallback
//! - Bounded per-agent history
//! - Sentiment, trend, confidence and liquidity action per agent
//! - LLM advice over the ranked signals
//! - HTTP response surface and Prometheus metrics

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, Secrets, TelemetryConfig, UpstreamConfig};
pub use error::{AppError, AppResult};
