//! Signal engine.
//!
//! Maps one snapshot onto a [`MarketSignal`]:
//! - sentiment: weighted sum of percentage deltas, unbounded
//! - trend: five bands split at ±15 and ±30 (strict comparisons)
//! - confidence: mean of engagement and liquidity ratios, capped at 100
//! - liquidity action: fixed string per trend

use crate::config::{ScoringMode, SignalConfig};
use pulse_core::{EntitySnapshot, MarketSignal, MarketTrend};
use tracing::trace;

/// Score strictly above this is `STRONG_BUY`; strictly below its negation `STRONG_SELL`.
pub const STRONG_BUY_THRESHOLD: f64 = 30.0;
/// Score strictly above this is `BUY`; strictly below its negation `SELL`.
pub const BUY_THRESHOLD: f64 = 15.0;

const MAX_CONFIDENCE: f64 = 100.0;

/// Stateless signal engine for one scoring mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalEngine {
    mode: ScoringMode,
}

impl SignalEngine {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            mode: config.scoring_mode,
        }
    }

    pub fn with_mode(mode: ScoringMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Weighted combination of the snapshot's percentage deltas.
    pub fn sentiment_score(&self, snapshot: &EntitySnapshot) -> f64 {
        let w = self.mode.weights();
        snapshot.mindshare_delta_percent * w.mindshare
            + snapshot.market_cap_delta_percent * w.market_cap
            + snapshot.price_delta_percent * w.price
            + snapshot.volume_24h_delta_percent * w.volume
            + snapshot.holders_count_delta_percent * w.holders
            + snapshot.average_engagements_count_delta_percent * w.engagement
    }

    /// Full signal for one snapshot.
    pub fn evaluate(&self, snapshot: &EntitySnapshot) -> MarketSignal {
        let sentiment_score = self.sentiment_score(snapshot);
        let market_trend = classify_trend(sentiment_score);
        let confidence = confidence(snapshot);

        trace!(
            agent = %snapshot.agent_name,
            mode = self.mode.as_str(),
            sentiment_score,
            trend = %market_trend,
            confidence,
            "Signal evaluated"
        );

        MarketSignal {
            agent_name: snapshot.agent_name.clone(),
            sentiment_score,
            market_trend,
            liquidity_action: liquidity_action(market_trend).to_string(),
            confidence,
        }
    }
}

/// Classify a sentiment score.
///
/// Boundaries are exclusive: exactly 30 is `BUY`, exactly 15 is `NEUTRAL`.
/// A NaN score fails every comparison and lands on `NEUTRAL`.
pub fn classify_trend(score: f64) -> MarketTrend {
    if score > STRONG_BUY_THRESHOLD {
        MarketTrend::StrongBuy
    } else if score > BUY_THRESHOLD {
        MarketTrend::Buy
    } else if score < -STRONG_BUY_THRESHOLD {
        MarketTrend::StrongSell
    } else if score < -BUY_THRESHOLD {
        MarketTrend::Sell
    } else {
        MarketTrend::Neutral
    }
}

/// Reliability of a snapshot in [0, 100].
///
/// Zero or negative follower count gives an engagement ratio of 0, and the
/// same for liquidity, so the result is always finite.
pub fn confidence(snapshot: &EntitySnapshot) -> f64 {
    let engagement_ratio = ratio_percent(
        snapshot.average_engagements_count,
        snapshot.followers_count,
    );
    let liquidity_ratio = ratio_percent(snapshot.volume_24h, snapshot.liquidity);
    let raw = (engagement_ratio + liquidity_ratio) / 2.0;
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, MAX_CONFIDENCE)
}

fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Recommended allocation change for a trend.
pub fn liquidity_action(trend: MarketTrend) -> &'static str {
    match trend {
        MarketTrend::StrongBuy => "increase allocation 50%",
        MarketTrend::Buy => "increase allocation 25%",
        MarketTrend::Neutral => "maintain current allocation",
        MarketTrend::Sell => "decrease allocation 25%",
        MarketTrend::StrongSell => "decrease allocation 50%",
    }
}
