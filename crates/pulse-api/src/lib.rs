//! Response surface for agentpulse.
//!
//! - `AnalysisPublisher`: scheduler sink that attaches advice and stores the
//!   latest response
//! - axum server: `GET /api/analyze`, `GET /health`, `GET /metrics`
//! - `AnalysisClient`: retrying, polling consumer of `/api/analyze`

pub mod config;
pub mod error;
pub mod publisher;
pub mod refresh;
pub mod server;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use publisher::AnalysisPublisher;
pub use refresh::{fetch_with_retry, AnalysisClient, RefreshPolicy};
pub use server::{create_router, run_server, serve, NOT_READY_MESSAGE};
pub use state::ApiState;
pub use types::{AnalysisResponse, ErrorResponse, HealthResponse, Published, TOTAL_FAILURE_MESSAGE};
