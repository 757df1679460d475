//! HTTP server implementation using axum.

use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::ApiState;
use crate::types::{ErrorResponse, Published};

/// Error message served before the first cycle completes.
pub const NOT_READY_MESSAGE: &str = "Analysis not ready";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Create the axum router.
pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze", get(get_analysis))
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .layer(cors)
        .with_state(state)
}

/// Latest published cycle.
async fn get_analysis(State(state): State<ApiState>) -> Response {
    match state.latest() {
        Some(Published::Analysis(response)) => Json(response).into_response(),
        Some(Published::Failure(response)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                NOT_READY_MESSAGE,
                vec!["No cycle has completed yet".to_string()],
            )),
        )
            .into_response(),
    }
}

async fn get_health(State(state): State<ApiState>) -> Response {
    Json(state.health()).into_response()
}

async fn get_metrics() -> Response {
    match pulse_telemetry::encode_text() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve on an already bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: ApiState,
    shutdown: CancellationToken,
) -> ApiResult<()> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| ApiError::Serve(e.to_string()))
}

/// Bind the configured address and serve until `shutdown` is cancelled.
pub async fn run_server(
    state: ApiState,
    config: &ApiConfig,
    shutdown: CancellationToken,
) -> ApiResult<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await.map_err(|source| ApiError::Bind {
        addr: addr.to_string(),
        source,
    })?;
    info!(%addr, "Starting API server");
    serve(listener, state, shutdown).await
}
