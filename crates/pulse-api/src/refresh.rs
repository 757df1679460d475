//! Client-side refresh policy for the analysis endpoint.
//!
//! A failed fetch is retried up to three times with exponential backoff
//! (1s, 2s, 4s). Independently of failures the endpoint is polled every
//! five minutes. Nothing in the pipeline depends on this module; it backs
//! the `watch` command and any dashboard that wants the same behaviour.

use crate::error::{ApiError, ApiResult};
use crate::types::{AnalysisResponse, ErrorResponse};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Retry and polling schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_delay: Duration,
    /// Time between polls.
    pub poll_interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl RefreshPolicy {
    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Run `attempt` until it succeeds or the retries are used up.
///
/// Returns the last error when every attempt failed.
pub async fn fetch_with_retry<T, F, Fut>(policy: &RefreshPolicy, mut attempt: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut retry = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if retry < policy.max_retries => {
                let delay = policy.backoff(retry);
                warn!(
                    error = %e,
                    retry = retry + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Client for `GET /api/analyze`.
pub struct AnalysisClient {
    http: Client,
    url: String,
    policy: RefreshPolicy,
}

impl AnalysisClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str, policy: RefreshPolicy) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: format!("{}/api/analyze", base_url.trim_end_matches('/')),
            policy,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Single request, no retry.
    pub async fn fetch_once(&self) -> ApiResult<AnalysisResponse> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) if error.details.is_empty() => error.error,
                Ok(error) => format!("{}: {}", error.error, error.details.join("; ")),
                Err(_) => body,
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetch with the retry schedule of the policy.
    pub async fn fetch(&self) -> ApiResult<AnalysisResponse> {
        fetch_with_retry(&self.policy, || self.fetch_once()).await
    }

    /// Fetch now and then once per poll interval until cancelled.
    ///
    /// `on_update` receives every outcome, including failures that
    /// survived all retries.
    pub async fn poll<F>(&self, shutdown: CancellationToken, mut on_update: F)
    where
        F: FnMut(ApiResult<AnalysisResponse>),
    {
        info!(
            url = %self.url,
            interval_secs = self.policy.poll_interval.as_secs(),
            "Polling analysis"
        );
        loop {
            let outcome = tokio::select! {
                outcome = self.fetch() => outcome,
                () = shutdown.cancelled() => break,
            };
            on_update(outcome);

            tokio::select! {
                () = tokio::time::sleep(self.policy.poll_interval) => {}
                () = shutdown.cancelled() => break,
            }
        }
        debug!("Polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_policy() -> RefreshPolicy {
        RefreshPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            poll_interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_default_schedule() {
        let policy = RefreshPolicy::default();
        let delays: Vec<_> = (0..policy.max_retries).map(|r| policy.backoff(r)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
        assert_eq!(policy.poll_interval, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = Cell::new(0);
        let result = fetch_with_retry(&fast_policy(), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(ApiError::Request("refused".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(tokio_test::assert_ok!(result), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_three_retries() {
        let calls = Cell::new(0);
        let result: ApiResult<()> = fetch_with_retry(&fast_policy(), || {
            calls.set(calls.get() + 1);
            async { Err(ApiError::Request("refused".to_string())) }
        })
        .await;
        tokio_test::assert_err!(result);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_client_url() {
        let client =
            AnalysisClient::new("http://localhost:8080/", RefreshPolicy::default()).unwrap();
        assert_eq!(client.url(), "http://localhost:8080/api/analyze");
    }
}
