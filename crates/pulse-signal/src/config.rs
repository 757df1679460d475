//! Signal engine configuration.

use crate::error::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights applied to each percentage delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentWeights {
    pub mindshare: f64,
    pub market_cap: f64,
    pub price: f64,
    pub volume: f64,
    pub holders: f64,
    pub engagement: f64,
}

impl SentimentWeights {
    pub fn sum(&self) -> f64 {
        self.mindshare + self.market_cap + self.price + self.volume + self.holders + self.engagement
    }
}

/// Named sentiment scoring formula.
///
/// Both formulas exist upstream with no rule connecting them, so the mode
/// is always chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Six-term formula over social and market deltas.
    #[default]
    Weighted6,
    /// Reduced formula over mindshare, market cap and price only.
    Weighted3,
}

impl ScoringMode {
    pub fn weights(&self) -> SentimentWeights {
        match self {
            Self::Weighted6 => SentimentWeights {
                mindshare: 0.25,
                market_cap: 0.20,
                price: 0.15,
                volume: 0.15,
                holders: 0.15,
                engagement: 0.10,
            },
            Self::Weighted3 => SentimentWeights {
                mindshare: 0.4,
                market_cap: 0.4,
                price: 0.2,
                volume: 0.0,
                holders: 0.0,
                engagement: 0.0,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weighted6 => "weighted6",
            Self::Weighted3 => "weighted3",
        }
    }
}

/// Configuration for the signal engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Sentiment formula.
    #[serde(default)]
    pub scoring_mode: ScoringMode,
}

impl SignalConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> SignalResult<()> {
        let sum = self.scoring_mode.weights().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SignalError::ConfigError(format!(
                "{} weights sum to {sum}, expected 1.0",
                self.scoring_mode.as_str()
            )));
        }
        Ok(())
    }
}
