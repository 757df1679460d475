//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] pulse_upstream::UpstreamError),

    #[error("Engine error: {0}")]
    Engine(#[from] pulse_engine::EngineError),

    #[error("Signal error: {0}")]
    Signal(#[from] pulse_signal::SignalError),

    #[error("Advice error: {0}")]
    Advice(#[from] pulse_advice::AdviceError),

    #[error("API error: {0}")]
    Api(#[from] pulse_api::ApiError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] pulse_telemetry::TelemetryError),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
