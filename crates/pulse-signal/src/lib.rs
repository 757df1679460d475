//! Signal engine for agentpulse.
//!
//! Pure functions turning one snapshot into a sentiment score, a trend
//! classification, a confidence value and a liquidity action. No I/O and
//! no state shared between calls.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{ScoringMode, SentimentWeights, SignalConfig};
pub use engine::{
    classify_trend, confidence, liquidity_action, SignalEngine, BUY_THRESHOLD,
    STRONG_BUY_THRESHOLD,
};
pub use error::{SignalError, SignalResult};
