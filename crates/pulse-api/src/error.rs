//! API error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Request failed: {0}")]
    Request(String),

    /// Non-2xx answer from the analysis endpoint.
    #[error("Analysis endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode analysis: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
