//! Engine error types.

use pulse_signal::SignalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

pub type EngineResult<T> = Result<T, EngineError>;
