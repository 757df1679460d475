//! Mock upstream server for integration tests.
//!
//! Serves the agent metrics endpoint, the chat completions endpoint and the
//! tweet search endpoint on an ephemeral port. Each handle has a scripted
//! behavior and every request is recorded.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const TEST_API_KEY: &str = "test-upstream-key";
pub const TEST_ADVICE: &str = "Rotate into VIRTUAL, trim AIXBT.";

const INTERVAL_NOT_FOUND: &str = "Interval data for the requested interval not found";

/// How the metrics endpoint answers for one handle.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Data in every window.
    Ok(Value),
    /// 7-day window missing, 3-day window present.
    OnlyThreeDays(Value),
    /// Both windows missing.
    NoData,
    /// HTTP 500 on every request.
    ServerError,
    /// 200 with `success: false`.
    Unsuccessful,
}

/// One recorded metrics request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub interval: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Default)]
struct Inner {
    behaviors: HashMap<String, Behavior>,
    requests: Vec<RecordedRequest>,
    completions: Vec<Value>,
    searches: Vec<(String, HashMap<String, String>)>,
}

type Shared = Arc<Mutex<Inner>>;

/// A mock upstream server for testing.
pub struct MockUpstream {
    addr: SocketAddr,
    inner: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    /// Start a new mock server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let inner: Shared = Arc::new(Mutex::new(Inner::default()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let router = Router::new()
            .route("/agents/twitterUsername/{handle}", get(agent_metrics))
            .route("/chat/completions", post(chat_completion))
            .route("/hackathon/search/{query}", get(search))
            .with_state(inner.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            inner,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_behavior(&self, handle: &str, behavior: Behavior) {
        self.inner.lock().behaviors.insert(handle.to_string(), behavior);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().requests.clone()
    }

    /// Intervals requested for one handle, in order.
    pub fn intervals_for(&self, handle: &str) -> Vec<String> {
        let suffix = format!("/{handle}");
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(&suffix))
            .filter_map(|r| r.interval)
            .collect()
    }

    pub fn completions(&self) -> Vec<Value> {
        self.inner.lock().completions.clone()
    }

    pub fn searches(&self) -> Vec<(String, HashMap<String, String>)> {
        self.inner.lock().searches.clone()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Agent payload with the given deltas and absolute values.
pub fn agent_payload(name: &str, mindshare_delta: f64, price_delta: f64) -> Value {
    json!({
        "agentName": name,
        "contracts": [{ "chain": 8453, "contractAddress": "0xabc" }],
        "twitterUsernames": [name.to_lowercase()],
        "mindshare": 2.5,
        "mindshareDeltaPercent": mindshare_delta,
        "marketCap": 1_000_000.0,
        "marketCapDeltaPercent": 10.0,
        "price": 0.5,
        "priceDeltaPercent": price_delta,
        "liquidity": 250_000.0,
        "volume24Hours": 100_000.0,
        "volume24HoursDeltaPercent": 20.0,
        "holdersCount": 5000.0,
        "holdersCountDeltaPercent": 5.0,
        "averageImpressionsCount": 1000.0,
        "averageImpressionsCountDeltaPercent": 0.0,
        "averageEngagementsCount": 50.0,
        "averageEngagementsCountDeltaPercent": 15.0,
        "followersCount": 10_000.0,
        "smartFollowersCount": 500.0,
        "topTweets": []
    })
}

fn envelope(payload: Value) -> Value {
    json!({ "ok": payload, "success": true, "error": null })
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "ok": null,
            "success": false,
            "error": { "errorMessage": INTERVAL_NOT_FOUND }
        })),
    )
}

async fn agent_metrics(
    State(inner): State<Shared>,
    Path(handle): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let interval = params.get("interval").cloned();
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let behavior = {
        let mut inner = inner.lock();
        inner.requests.push(RecordedRequest {
            path: format!("/agents/twitterUsername/{handle}"),
            interval: interval.clone(),
            api_key: api_key.clone(),
        });
        inner.behaviors.get(&handle).cloned()
    };

    if api_key.as_deref() != Some(TEST_API_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad api key" })));
    }

    match behavior {
        Some(Behavior::Ok(payload)) => (StatusCode::OK, Json(envelope(payload))),
        Some(Behavior::OnlyThreeDays(payload)) => match interval.as_deref() {
            Some("_3Days") => (StatusCode::OK, Json(envelope(payload))),
            _ => not_found(),
        },
        Some(Behavior::NoData) | None => not_found(),
        Some(Behavior::ServerError) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "upstream exploded" })),
        ),
        Some(Behavior::Unsuccessful) => (
            StatusCode::OK,
            Json(json!({ "ok": null, "success": false, "error": "rate limited" })),
        ),
    }
}

async fn chat_completion(State(inner): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    inner.lock().completions.push(body);
    Json(json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": TEST_ADVICE },
            "finish_reason": "stop"
        }]
    }))
}

async fn search(
    State(inner): State<Shared>,
    Path(query): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    inner.lock().searches.push((query.clone(), params));
    Json(json!({ "ok": [{ "text": format!("tweet about {query}") }], "success": true }))
}
