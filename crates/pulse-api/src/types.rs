//! Wire types of the response surface.

use chrono::{DateTime, Utc};
use pulse_core::{CycleResult, MarketSignal};
use serde::{Deserialize, Serialize};

/// Message for a cycle that produced no signal.
pub const TOTAL_FAILURE_MESSAGE: &str = "Failed to fetch any agent data";

/// Body of a successful `GET /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Ranked by confidence, highest first.
    pub signals: Vec<MarketSignal>,
    pub ai_advice: String,
    pub timestamp: DateTime<Utc>,
    /// Present only when at least one entity failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl AnalysisResponse {
    pub fn from_cycle(result: &CycleResult, ai_advice: String) -> Self {
        let warnings = result.warnings();
        Self {
            signals: result.signals.clone(),
            ai_advice,
            timestamp: result.finished_at,
            warnings: (!warnings.is_empty()).then_some(warnings),
        }
    }
}

/// Error body for whole-cycle failures and unavailable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            error: error.into(),
            details,
        }
    }

    pub fn total_failure(result: &CycleResult) -> Self {
        Self::new(TOTAL_FAILURE_MESSAGE, result.warnings())
    }
}

/// Latest outcome published by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    Analysis(AnalysisResponse),
    Failure(ErrorResponse),
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub cycles_published: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub uptime_secs: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{EntityFailure, FailureKind, MarketTrend};

    fn signal() -> MarketSignal {
        MarketSignal {
            agent_name: "NRN Agents".to_string(),
            sentiment_score: 17.25,
            market_trend: MarketTrend::Buy,
            liquidity_action: "increase allocation 25%".to_string(),
            confidence: 42.0,
        }
    }

    #[test]
    fn test_warnings_omitted_when_clean() {
        let result = CycleResult::new(1, Utc::now(), vec![signal()], Vec::new());
        let response = AnalysisResponse::from_cycle(&result, "- hold".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("warnings").is_none());
        assert_eq!(json["aiAdvice"], "- hold");
        assert_eq!(json["signals"][0]["agentName"], "NRN Agents");
        assert_eq!(json["signals"][0]["marketTrend"], "BUY");
        assert_eq!(json["signals"][0]["liquidityAction"], "increase allocation 25%");
        // ISO-8601 with timezone.
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_warnings_present_on_partial() {
        let result = CycleResult::new(
            1,
            Utc::now(),
            vec![signal()],
            vec![EntityFailure::new("vitaieth", FailureKind::Transport, "HTTP 502")],
        );
        let response = AnalysisResponse::from_cycle(&result, String::new());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json["warnings"],
            serde_json::json!(["Failed to fetch data for vitaieth: HTTP 502"])
        );
    }

    #[test]
    fn test_total_failure_body() {
        let result = CycleResult::new(
            4,
            Utc::now(),
            Vec::new(),
            vec![EntityFailure::new("a", FailureKind::NoData, "no interval data")],
        );
        let json = serde_json::to_value(ErrorResponse::total_failure(&result)).unwrap();
        assert_eq!(json["error"], "Failed to fetch any agent data");
        assert_eq!(json["details"][0], "Failed to fetch data for a: no interval data");
    }
}
