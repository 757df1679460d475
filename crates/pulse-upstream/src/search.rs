//! Tweet search client.
//!
//! Keyword search over a date range against the v1 endpoint. Stateless,
//! single call, no retry. Not part of the signal pipeline.

use crate::error::{UpstreamError, UpstreamResult};
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use zeroize::Zeroizing;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Search request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Word or phrase to search for in tweet text.
    pub query: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, from: NaiveDate, to: NaiveDate) -> UpstreamResult<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(UpstreamError::Search("search query is blank".to_string()));
        }
        if from > to {
            return Err(UpstreamError::Search(format!(
                "date range is inverted: {from} > {to}"
            )));
        }
        Ok(Self { query, from, to })
    }
}

/// Client for the tweet search endpoint.
pub struct SearchClient {
    client: Client,
    base_url: String,
    api_key: Zeroizing<String>,
}

impl SearchClient {
    /// Create a new search client.
    ///
    /// # Arguments
    /// * `base_url` - v1 API base (e.g., "https://api.cookie.fun/v1")
    pub fn new(base_url: impl Into<String>, api_key: Zeroizing<String>) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| UpstreamError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn endpoint(&self, query: &SearchQuery) -> String {
        format!(
            "{}/hackathon/search/{}?from={}&to={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.from.format("%Y-%m-%d"),
            query.to.format("%Y-%m-%d"),
        )
    }

    /// Run one search and return the raw JSON response.
    pub async fn search(&self, query: &SearchQuery) -> UpstreamResult<serde_json::Value> {
        info!(query = %query.query, from = %query.from, to = %query.to, "Searching tweets");

        let response = self
            .client
            .get(self.endpoint(query))
            .header("x-api-key", self.api_key.as_str())
            .send()
            .await
            .map_err(|e| UpstreamError::Search(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Search(format!("API Error {status}: {body}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Search(format!("Failed to parse response: {e}")))?;

        debug!("Search response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let client =
            SearchClient::new("https://api.cookie.fun/v1", Zeroizing::new("k".into())).unwrap();
        let query = SearchQuery::new("ai agents", date("2023-10-01"), date("2023-10-15")).unwrap();
        assert_eq!(
            client.endpoint(&query),
            "https://api.cookie.fun/v1/hackathon/search/ai%20agents?from=2023-10-01&to=2023-10-15"
        );
    }

    #[test]
    fn test_query_validation() {
        assert!(SearchQuery::new(" ", date("2023-10-01"), date("2023-10-15")).is_err());
        assert!(SearchQuery::new("x", date("2023-10-15"), date("2023-10-01")).is_err());
        assert!(SearchQuery::new("x", date("2023-10-01"), date("2023-10-01")).is_ok());
    }
}
