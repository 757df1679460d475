//! Application configuration.
//!
//! Loaded from TOML. Every section is optional and falls back to the
//! defaults below. API keys are never read from the file: each section
//! names the environment variable that holds its key.

use crate::error::{AppError, AppResult};
use pulse_advice::AdviceConfig;
use pulse_api::ApiConfig;
use pulse_core::{EntityKey, Interval};
use pulse_engine::{HistoryConfig, SchedulerConfig};
use pulse_signal::SignalConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;
use zeroize::Zeroizing;

/// Config file used when neither `--config` nor `PULSE_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable overriding the config path.
pub const CONFIG_ENV_VAR: &str = "PULSE_CONFIG";

/// Agents tracked when the config names none.
pub const DEFAULT_ROSTER: [&str; 8] = [
    "NRNAgents",
    "ArbDoge_AI",
    "AiAgentLima",
    "OverlordBot_",
    "Gameboiai",
    "vitaieth",
    "delaunch",
    "reika_ai_",
];

/// Upstream metrics API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// v2 base for agent metrics.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// v1 base for tweet search.
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,
    /// Environment variable holding the `x-api-key` value.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Window requested first; the other one is the fallback.
    #[serde(default)]
    pub preferred_interval: Interval,
}

fn default_base_url() -> String {
    "https://api.cookie.fun/v2".to_string()
}

fn default_search_base_url() -> String {
    "https://api.cookie.fun/v1".to_string()
}

fn default_api_key_env() -> String {
    "COOKIE_FUN_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_base_url: default_search_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            preferred_interval: Interval::default(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Base log level, used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Filter directive for the logging subscriber.
    pub fn filter(&self) -> String {
        format!("{},pulse=debug", self.log_level)
    }
}

fn default_roster() -> Vec<EntityKey> {
    DEFAULT_ROSTER.iter().map(|h| EntityKey::twitter(*h)).collect()
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agents to track, in ranking tie-break order.
    #[serde(default = "default_roster")]
    pub roster: Vec<EntityKey>,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub advice: AdviceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            upstream: UpstreamConfig::default(),
            history: HistoryConfig::default(),
            signal: SignalConfig::default(),
            scheduler: SchedulerConfig::default(),
            advice: AdviceConfig::default(),
            api: ApiConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Resolve and load configuration.
    ///
    /// An explicit path (CLI argument, then `PULSE_CONFIG`) must exist. The
    /// default path may be missing, in which case built-in defaults apply.
    pub fn load(explicit: Option<String>) -> AppResult<(Self, String)> {
        let explicit = explicit.or_else(|| std::env::var(CONFIG_ENV_VAR).ok());
        match explicit {
            Some(path) => Ok((Self::from_file(&path)?, path)),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Ok((Self::from_file(DEFAULT_CONFIG_PATH)?, DEFAULT_CONFIG_PATH.to_string()))
            }
            None => Ok((Self::default(), "<built-in defaults>".to_string())),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        if self.roster.is_empty() {
            return Err(AppError::Config("roster must not be empty".to_string()));
        }
        for key in &self.roster {
            key.validate()
                .map_err(|e| AppError::Config(format!("roster entry {key:?}: {e}")))?;
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(AppError::Config("upstream.base_url must not be empty".to_string()));
        }
        if self.upstream.api_key_env.trim().is_empty() {
            return Err(AppError::Config("upstream.api_key_env must not be empty".to_string()));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(AppError::Config(
                "upstream.timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.history.validate()?;
        self.scheduler.validate()?;
        self.signal.validate()?;
        self.advice.validate()?;
        Ok(())
    }

    /// Read API keys from the environment.
    ///
    /// A missing upstream key is fatal. A missing advice key only disables
    /// advice.
    pub fn load_secrets(&self) -> AppResult<Secrets> {
        let upstream_api_key = read_secret(&self.upstream.api_key_env).ok_or_else(|| {
            AppError::Config(format!("{} is not set", self.upstream.api_key_env))
        })?;

        let advice_api_key = if self.advice.enabled {
            let key = read_secret(&self.advice.api_key_env);
            if key.is_none() {
                warn!(
                    env = %self.advice.api_key_env,
                    "Advice API key not set, advice disabled"
                );
            }
            key
        } else {
            None
        };

        Ok(Secrets {
            upstream_api_key,
            advice_api_key,
        })
    }

    /// Upstream requests per minute as `(min, max)`.
    ///
    /// The minimum is one request per agent per cycle; the maximum counts
    /// an interval fallback for every agent.
    pub fn upstream_calls_per_minute(&self) -> (f64, f64) {
        let cycles_per_minute = 60.0 / self.scheduler.interval_secs.max(1) as f64;
        let per_cycle = self.roster.len() as f64;
        (
            per_cycle * cycles_per_minute,
            per_cycle * (1 + pulse_upstream::MAX_INTERVAL_FALLBACKS) as f64 * cycles_per_minute,
        )
    }
}

/// API keys loaded from the environment.
pub struct Secrets {
    pub upstream_api_key: Zeroizing<String>,
    /// `None` when advice is disabled or its key is unset.
    pub advice_api_key: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("upstream_api_key", &"<redacted>")
            .field(
                "advice_api_key",
                &self.advice_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn read_secret(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}
