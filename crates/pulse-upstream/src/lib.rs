//! Upstream metrics access for agentpulse.
//!
//! Fetches one agent snapshot at a time from the metrics endpoint, falling
//! back once between the 7-day and 3-day reporting windows when the
//! preferred window has no data. Also hosts the tweet search client, which
//! talks to the older v1 endpoint and is not part of the signal pipeline.

pub mod client;
pub mod envelope;
pub mod error;
pub mod search;
pub mod source;

pub use client::{
    fetch_with_fallback, Fetched, MetricsClient, MetricsClientConfig, MAX_INTERVAL_FALLBACKS,
};
pub use envelope::{classify_response, AgentResponse, AttemptOutcome, INTERVAL_NOT_FOUND_MARKER};
pub use error::{UpstreamError, UpstreamResult};
pub use search::{SearchClient, SearchQuery};
pub use source::{MockSnapshotSource, SnapshotSource};
