//! Advice error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Advice API key not configured")]
    NotConfigured,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Advice API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse completion: {0}")]
    Decode(String),
}

impl AdviceError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::NotConfigured => "not_configured",
            Self::HttpClient(_) => "http_client",
            Self::Request(_) => "request",
            Self::Api { .. } => "api",
            Self::Decode(_) => "decode",
        }
    }
}

pub type AdviceResult<T> = Result<T, AdviceError>;
