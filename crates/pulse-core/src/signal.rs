//! Market signal types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trend classification of a sentiment score.
///
/// Variants are declared from most bullish to most bearish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketTrend {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl MarketTrend {
    /// All classifications, bullish to bearish.
    pub const ALL: [MarketTrend; 5] = [
        Self::StrongBuy,
        Self::Buy,
        Self::Neutral,
        Self::Sell,
        Self::StrongSell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Neutral => "NEUTRAL",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, Self::StrongSell | Self::Sell)
    }
}

impl fmt::Display for MarketTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored projection of one snapshot.
///
/// Created fresh every cycle and never mutated. Serialized with the field
/// names the response surface has always used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSignal {
    pub agent_name: String,
    /// Weighted delta combination. Unbounded.
    pub sentiment_score: f64,
    pub market_trend: MarketTrend,
    pub liquidity_action: String,
    /// Reliability in [0, 100].
    pub confidence: f64,
}

impl MarketSignal {
    /// One-line human readable summary, as fed to the advice generator.
    pub fn summary_line(&self) -> String {
        format!(
            "{}: Score {:.2}, {}, Confidence {:.2}%",
            self.agent_name, self.sentiment_score, self.market_trend, self.confidence
        )
    }
}
