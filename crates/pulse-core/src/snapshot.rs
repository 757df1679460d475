//! Upstream metrics snapshot.
//!
//! Mirrors the agent payload returned by the metrics endpoint. The upstream
//! occasionally sends `null` or omits fields for thinly traded agents, so
//! every field decodes to its default in that case: `0.0` for numbers, empty
//! for strings and lists.

use serde::{Deserialize, Deserializer, Serialize};

/// On-chain contract associated with an agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentContract {
    /// Chain identifier as reported upstream.
    #[serde(deserialize_with = "default_if_null")]
    pub chain: i64,
    #[serde(deserialize_with = "default_if_null")]
    pub contract_address: String,
}

/// Featured tweet. Passed through untouched, never scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopTweet {
    #[serde(deserialize_with = "default_if_null")]
    pub tweet_url: String,
    #[serde(deserialize_with = "default_if_null")]
    pub tweet_author_profile_image_url: String,
    #[serde(deserialize_with = "default_if_null")]
    pub tweet_author_display_name: String,
    #[serde(deserialize_with = "default_if_null")]
    pub smart_engagement_points: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub impressions_count: f64,
}

/// One point-in-time read of an agent's public metrics.
///
/// Immutable once fetched; the history store and the signal engine only
/// ever read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntitySnapshot {
    #[serde(deserialize_with = "default_if_null")]
    pub agent_name: String,
    #[serde(deserialize_with = "default_if_null")]
    pub contracts: Vec<AgentContract>,
    #[serde(deserialize_with = "default_if_null")]
    pub twitter_usernames: Vec<String>,

    #[serde(deserialize_with = "default_if_null")]
    pub mindshare: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub mindshare_delta_percent: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub market_cap: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub market_cap_delta_percent: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub price: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub price_delta_percent: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub liquidity: f64,

    #[serde(rename = "volume24Hours", deserialize_with = "default_if_null")]
    pub volume_24h: f64,
    #[serde(rename = "volume24HoursDeltaPercent", deserialize_with = "default_if_null")]
    pub volume_24h_delta_percent: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub holders_count: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub holders_count_delta_percent: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub average_impressions_count: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub average_impressions_count_delta_percent: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub average_engagements_count: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub average_engagements_count_delta_percent: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub followers_count: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub smart_followers_count: f64,

    #[serde(deserialize_with = "default_if_null")]
    pub top_tweets: Vec<TopTweet>,
}

fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_upstream_payload() {
        let json = r#"{
            "agentName": "NRN Agents",
            "contracts": [{"chain": 8453, "contractAddress": "0xc0041ef357b183448b235a8ea73ce4e4ec8c265f"}],
            "twitterUsernames": ["NRNAgents"],
            "mindshare": 1.2,
            "mindshareDeltaPercent": 40.0,
            "marketCap": 1000000,
            "marketCapDeltaPercent": 20.0,
            "price": 0.01,
            "priceDeltaPercent": 10.0,
            "liquidity": 50000,
            "volume24Hours": 25000,
            "volume24HoursDeltaPercent": 5.0,
            "holdersCount": 1200,
            "holdersCountDeltaPercent": 0.0,
            "averageImpressionsCount": 3000,
            "averageImpressionsCountDeltaPercent": -2.5,
            "averageEngagementsCount": 150,
            "averageEngagementsCountDeltaPercent": 10.0,
            "followersCount": 10000,
            "smartFollowersCount": 300,
            "topTweets": [{"tweetUrl": "https://x.com/a/status/1", "impressionsCount": 99}]
        }"#;

        let snapshot: EntitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.agent_name, "NRN Agents");
        assert_eq!(snapshot.contracts[0].chain, 8453);
        assert_eq!(snapshot.volume_24h, 25000.0);
        assert_eq!(snapshot.volume_24h_delta_percent, 5.0);
        assert_eq!(snapshot.average_engagements_count_delta_percent, 10.0);
        assert_eq!(snapshot.top_tweets.len(), 1);
        assert_eq!(snapshot.top_tweets[0].impressions_count, 99.0);
    }

    #[test]
    fn test_null_and_missing_fields_default_to_zero() {
        let json = r#"{"agentName": "thin", "price": null, "liquidity": null}"#;
        let snapshot: EntitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.price, 0.0);
        assert_eq!(snapshot.liquidity, 0.0);
        assert_eq!(snapshot.followers_count, 0.0);
        assert!(snapshot.contracts.is_empty());
        assert!(snapshot.top_tweets.is_empty());
    }

    #[test]
    fn test_null_lists_decode_empty() {
        let json = r#"{
            "agentName": "NRN",
            "mindshareDeltaPercent": 12.5,
            "contracts": null,
            "twitterUsernames": null,
            "topTweets": null
        }"#;
        let snapshot: EntitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.agent_name, "NRN");
        assert_eq!(snapshot.mindshare_delta_percent, 12.5);
        assert!(snapshot.contracts.is_empty());
        assert!(snapshot.twitter_usernames.is_empty());
        assert!(snapshot.top_tweets.is_empty());
    }

    #[test]
    fn test_null_strings_decode_empty() {
        let json = r#"{
            "agentName": null,
            "contracts": [{"chain": null, "contractAddress": null}],
            "topTweets": [{"tweetUrl": null, "tweetAuthorDisplayName": null, "impressionsCount": 7}]
        }"#;
        let snapshot: EntitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.agent_name, "");
        assert_eq!(snapshot.contracts[0], AgentContract::default());
        assert_eq!(snapshot.top_tweets[0].tweet_url, "");
        assert_eq!(snapshot.top_tweets[0].tweet_author_display_name, "");
        assert_eq!(snapshot.top_tweets[0].impressions_count, 7.0);
    }
}
