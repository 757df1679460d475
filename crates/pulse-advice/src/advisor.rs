//! Advice generators.

use crate::config::AdviceConfig;
use crate::error::{AdviceError, AdviceResult};
use crate::prompt::build_prompt;
use parking_lot::Mutex;
use pulse_core::{BoxFuture, MarketSignal};
use pulse_telemetry::Metrics;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Substituted for the advice text when generation fails.
pub const FALLBACK_ADVICE: &str =
    "AI advice generation failed. Please rely on the signal data below.";

/// Returned when the completion carries no text.
pub const NO_ADVICE: &str = "No advice generated";

/// Turns ranked signals into advice text.
pub trait AdviceGenerator: Send + Sync {
    fn advise<'a>(&'a self, signals: &'a [MarketSignal]) -> BoxFuture<'a, AdviceResult<String>>;
}

/// Ask `generator` for advice, substituting [`FALLBACK_ADVICE`] on failure.
pub async fn advise_or_fallback(
    generator: &dyn AdviceGenerator,
    signals: &[MarketSignal],
) -> String {
    match generator.advise(signals).await {
        Ok(advice) => advice,
        Err(e) => {
            warn!(error = %e, "Advice generation failed, using fallback note");
            Metrics::advice_failed(e.reason());
            FALLBACK_ADVICE.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Text of the first choice, or [`NO_ADVICE`] when there is none.
fn completion_text(body: &str) -> AdviceResult<String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AdviceError::Decode(e.to_string()))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty());
    Ok(content.unwrap_or_else(|| NO_ADVICE.to_string()))
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct ChatAdvisor {
    http: Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Zeroizing<String>,
}

impl ChatAdvisor {
    pub fn new(config: &AdviceConfig, api_key: Zeroizing<String>) -> AdviceResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AdviceError::NotConfigured);
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdviceError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request<'a>(&'a self, signals: &[MarketSignal]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(signals),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    async fn complete(&self, signals: &[MarketSignal]) -> AdviceResult<String> {
        debug!(model = %self.model, signals = signals.len(), "Requesting advice");

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(self.api_key.as_str())
            .json(&self.request(signals))
            .send()
            .await
            .map_err(|e| AdviceError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AdviceError::Request(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(AdviceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let advice = completion_text(&body)?;
        debug!(chars = advice.len(), "Advice received");
        Ok(advice)
    }
}

impl AdviceGenerator for ChatAdvisor {
    fn advise<'a>(&'a self, signals: &'a [MarketSignal]) -> BoxFuture<'a, AdviceResult<String>> {
        Box::pin(self.complete(signals))
    }
}

/// Scripted advisor for testing.
///
/// Replies are consumed in order; once exhausted the advisor fails with
/// `NotConfigured`. Every prompt it was asked about is recorded.
#[derive(Debug, Default)]
pub struct MockAdvisor {
    replies: Mutex<VecDeque<AdviceResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, advice: impl Into<String>) {
        self.replies.lock().push_back(Ok(advice.into()));
    }

    pub fn push_error(&self, error: AdviceError) {
        self.replies.lock().push_back(Err(error));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl AdviceGenerator for MockAdvisor {
    fn advise<'a>(&'a self, signals: &'a [MarketSignal]) -> BoxFuture<'a, AdviceResult<String>> {
        Box::pin(async move {
            self.prompts.lock().push(build_prompt(signals));
            self.replies
                .lock()
                .pop_front()
                .unwrap_or(Err(AdviceError::NotConfigured))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::MarketTrend;

    fn signals() -> Vec<MarketSignal> {
        vec![MarketSignal {
            agent_name: "NRN Agents".to_string(),
            sentiment_score: 17.25,
            market_trend: MarketTrend::Buy,
            liquidity_action: "increase allocation 25%".to_string(),
            confidence: 40.0,
        }]
    }

    #[test]
    fn test_completion_text_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"- buy NRN"}},{"message":{"content":"ignored"}}]}"#;
        assert_eq!(completion_text(body).unwrap(), "- buy NRN");
    }

    #[test]
    fn test_completion_text_empty_is_no_advice() {
        assert_eq!(completion_text(r#"{"choices":[]}"#).unwrap(), NO_ADVICE);
        assert_eq!(
            completion_text(r#"{"choices":[{"message":{"content":""}}]}"#).unwrap(),
            NO_ADVICE
        );
        assert_eq!(
            completion_text(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap(),
            NO_ADVICE
        );
    }

    #[test]
    fn test_completion_text_garbage_is_decode_error() {
        assert!(matches!(
            completion_text("<html>bad gateway</html>"),
            Err(AdviceError::Decode(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let advisor =
            ChatAdvisor::new(&AdviceConfig::default(), Zeroizing::new("key".to_string())).unwrap();
        let signals = signals();
        let body = serde_json::to_value(advisor.request(&signals)).unwrap();

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "user");
        let content = body["messages"][0]["content"].as_str().unwrap();
        assert!(content.ends_with("NRN Agents: Score 17.25, BUY, Confidence 40.00%"));
        assert_eq!(advisor.url(), "https://api.groq.com/openai/v1/chat/completions");
    }

    #[test]
    fn test_blank_key_not_configured() {
        let result = ChatAdvisor::new(&AdviceConfig::default(), Zeroizing::new("  ".to_string()));
        assert!(matches!(result, Err(AdviceError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let mock = MockAdvisor::new();
        mock.push_error(AdviceError::Api {
            status: 429,
            body: "rate limited".to_string(),
        });
        let advice = advise_or_fallback(&mock, &signals()).await;
        assert_eq!(advice, FALLBACK_ADVICE);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let mock = MockAdvisor::new();
        mock.push_reply("- hold");
        let advice = advise_or_fallback(&mock, &signals()).await;
        assert_eq!(advice, "- hold");
        assert_eq!(mock.prompts().len(), 1);
    }
}
