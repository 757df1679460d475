//! Upstream error types.

use pulse_core::{EntityFailure, FailureKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Transport failure for {key}: {detail}")]
    Transport { key: String, detail: String },

    #[error("No data for {key}: {detail}")]
    NoData { key: String, detail: String },

    #[error("Protocol violation for {key}: {detail}")]
    Protocol { key: String, detail: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Search failed: {0}")]
    Search(String),
}

impl UpstreamError {
    /// Pipeline failure classification.
    ///
    /// Client construction and search errors never reach the cycle; they
    /// classify as transport failures if they do.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoData { .. } => FailureKind::NoData,
            Self::Protocol { .. } => FailureKind::Protocol,
            Self::Transport { .. } | Self::HttpClient(_) | Self::Search(_) => {
                FailureKind::Transport
            }
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Transport { detail, .. }
            | Self::NoData { detail, .. }
            | Self::Protocol { detail, .. } => detail,
            Self::HttpClient(detail) | Self::Search(detail) => detail,
        }
    }

    /// Convert into the per-entity failure recorded by the orchestrator.
    pub fn to_entity_failure(&self, entity: &str) -> EntityFailure {
        EntityFailure::new(entity, self.kind(), self.detail())
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;
