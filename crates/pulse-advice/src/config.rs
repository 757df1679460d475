//! Advice generator configuration.

use crate::error::{AdviceError, AdviceResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_enabled() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

/// Chat completions endpoint settings.
///
/// The key itself never lives here, only the name of the environment
/// variable holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// OpenAI-compatible API base, without `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AdviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AdviceResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.base_url.trim().is_empty() {
            return Err(AdviceError::Config("advice.base_url must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(AdviceError::Config("advice.model must not be empty".to_string()));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(AdviceError::Config("advice.api_key_env must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AdviceError::Config(format!(
                "advice.temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(AdviceError::Config(
                "advice.max_tokens must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdviceConfig::default();
        assert!(config.enabled);
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.max_tokens, 500);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: AdviceConfig = toml::from_str(
            r#"
            model = "llama-3.1-8b-instant"
            max_tokens = 200
            "#,
        )
        .unwrap();
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.max_tokens, 200);
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AdviceConfig {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AdviceError::Config(_))));

        let config = AdviceConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // Disabled advice skips the checks.
        let config = AdviceConfig {
            enabled: false,
            model: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
