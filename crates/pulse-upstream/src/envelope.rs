//! Response envelope handling.
//!
//! Every metrics response is wrapped as `{ok, success, error}`. A 404 whose
//! body carries [`INTERVAL_NOT_FOUND_MARKER`] means the requested window has
//! no data and is the only condition that triggers the interval fallback.

use crate::error::{UpstreamError, UpstreamResult};
use pulse_core::{EntityKey, EntitySnapshot};
use serde::Deserialize;

/// Literal the upstream puts in the 404 body when a window has no data.
pub const INTERVAL_NOT_FOUND_MARKER: &str = "Interval data for the requested interval not found";

/// Upper bound on how much of an error body is kept in failure details.
const MAX_BODY_DETAIL_CHARS: usize = 200;

/// Raw agent response envelope.
#[derive(Debug, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub ok: Option<EntitySnapshot>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl AgentResponse {
    /// Validate the envelope and extract the payload.
    ///
    /// `success` and payload presence must agree; anything else is a
    /// protocol violation.
    pub fn into_snapshot(self, key: &EntityKey) -> UpstreamResult<EntitySnapshot> {
        match (self.success, self.ok) {
            (true, Some(snapshot)) => Ok(snapshot),
            (true, None) => Err(UpstreamError::Protocol {
                key: key.to_string(),
                detail: "success envelope without payload".to_string(),
            }),
            (false, Some(_)) => Err(UpstreamError::Protocol {
                key: key.to_string(),
                detail: "payload present but success flag is false".to_string(),
            }),
            (false, None) => Err(UpstreamError::Protocol {
                key: key.to_string(),
                detail: format!(
                    "unsuccessful envelope: {}",
                    self.error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "no error detail".to_string())
                ),
            }),
        }
    }
}

/// Outcome of a single request against one reporting window.
#[derive(Debug)]
pub enum AttemptOutcome {
    Found(EntitySnapshot),
    IntervalNotFound,
}

/// Classify a completed HTTP exchange.
pub fn classify_response(
    key: &EntityKey,
    status: u16,
    body: &str,
) -> UpstreamResult<AttemptOutcome> {
    if status == 404 && body.contains(INTERVAL_NOT_FOUND_MARKER) {
        return Ok(AttemptOutcome::IntervalNotFound);
    }

    if !(200..300).contains(&status) {
        return Err(UpstreamError::Transport {
            key: key.to_string(),
            detail: format!("HTTP {status}: {}", truncate(body)),
        });
    }

    let envelope: AgentResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::Protocol {
            key: key.to_string(),
            detail: format!("undecodable envelope: {e}"),
        })?;

    envelope.into_snapshot(key).map(AttemptOutcome::Found)
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_DETAIL_CHARS {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_BODY_DETAIL_CHARS).collect();
        format!("{head}...")
    }
}
