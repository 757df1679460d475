//! Core domain types for the agentpulse signal pipeline.
//!
//! This crate provides the types shared by every stage of the pipeline:
//! - `EntityKey`, `Interval`: how a tracked agent is addressed upstream
//! - `EntitySnapshot`: one fetched metrics reading
//! - `MarketSignal`, `MarketTrend`: the scored projection of a snapshot
//! - `CycleResult`, `EntityFailure`: the ranked output of one roster pass

pub mod cycle;
pub mod entity;
pub mod error;
pub mod future;
pub mod signal;
pub mod snapshot;

pub use cycle::{CycleResult, EntityFailure, FailureKind};
pub use entity::{EntityKey, Interval};
pub use error::{CoreError, Result};
pub use future::BoxFuture;
pub use signal::{MarketSignal, MarketTrend};
pub use snapshot::{AgentContract, EntitySnapshot, TopTweet};
