//! Error types for pulse-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid entity key: {0}")]
    InvalidEntityKey(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
