//! HTTP client for the agent metrics endpoint.
//!
//! `GET {base}/agents/{twitterUsername|contractAddress}/{key}?interval=..`
//! authenticated with the `x-api-key` header.

use crate::envelope::{classify_response, AttemptOutcome};
use crate::error::{UpstreamError, UpstreamResult};
use pulse_core::{EntityKey, EntitySnapshot, Interval};
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Default timeout for metrics requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How many times a lookup may switch to the alternate window.
///
/// A second "interval not found" is terminal.
pub const MAX_INTERVAL_FALLBACKS: u32 = 1;

/// Metrics client configuration.
#[derive(Clone)]
pub struct MetricsClientConfig {
    /// API base, e.g. `https://api.cookie.fun/v2`.
    pub base_url: String,
    /// Value sent as `x-api-key`.
    pub api_key: Zeroizing<String>,
    pub timeout: Duration,
}

impl MetricsClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Zeroizing::new(api_key.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for MetricsClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A snapshot together with the window that actually served it.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub snapshot: EntitySnapshot,
    pub interval: Interval,
    /// True when the preferred window had no data.
    pub fell_back: bool,
}

/// Client for the agent metrics endpoint.
pub struct MetricsClient {
    client: Client,
    base_url: String,
    api_key: Zeroizing<String>,
}

impl MetricsClient {
    /// Create a new metrics client.
    pub fn new(config: MetricsClientConfig) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Request URL for one key and window.
    pub fn endpoint(&self, key: &EntityKey, interval: Interval) -> String {
        format!(
            "{}/agents/{}/{}?interval={}",
            self.base_url,
            key.path_segment(),
            urlencoding::encode(key.value()),
            interval.as_query()
        )
    }

    /// Fetch one snapshot, falling back once to the alternate window.
    pub async fn fetch(&self, key: &EntityKey, preferred: Interval) -> UpstreamResult<Fetched> {
        fetch_with_fallback(key, preferred, |interval| self.attempt(key, interval)).await
    }

    /// Single request against one window. Never retries.
    async fn attempt(&self, key: &EntityKey, interval: Interval) -> UpstreamResult<AttemptOutcome> {
        let url = self.endpoint(key, interval);
        debug!(%key, %interval, "Fetching agent metrics");

        let response = self
            .client
            .get(&url)
            .header("x-api-key", self.api_key.as_str())
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                key: key.to_string(),
                detail: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| UpstreamError::Transport {
            key: key.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

        classify_response(key, status, &body)
    }
}

/// Drive `attempt` with the interval fallback policy.
///
/// Starts with `preferred`; on "interval not found" switches to the
/// alternate window at most [`MAX_INTERVAL_FALLBACKS`] times. Any error
/// from `attempt` is returned immediately without retry.
pub async fn fetch_with_fallback<F, Fut>(
    key: &EntityKey,
    preferred: Interval,
    mut attempt: F,
) -> UpstreamResult<Fetched>
where
    F: FnMut(Interval) -> Fut,
    Fut: Future<Output = UpstreamResult<AttemptOutcome>>,
{
    let mut interval = preferred;
    let mut fallbacks = 0;

    loop {
        match attempt(interval).await? {
            AttemptOutcome::Found(snapshot) => {
                return Ok(Fetched {
                    snapshot,
                    interval,
                    fell_back: fallbacks > 0,
                });
            }
            AttemptOutcome::IntervalNotFound if fallbacks < MAX_INTERVAL_FALLBACKS => {
                let next = interval.alternate();
                warn!(%key, from = %interval, to = %next, "Interval data not found, falling back");
                interval = next;
                fallbacks += 1;
            }
            AttemptOutcome::IntervalNotFound => {
                return Err(UpstreamError::NoData {
                    key: key.to_string(),
                    detail: format!("no interval data for {preferred} or {interval}"),
                });
            }
        }
    }
}
