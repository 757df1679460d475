//! Entity addressing types.
//!
//! A tracked agent is looked up upstream either by one of its twitter
//! handles or by one of its on-chain contract addresses. Every lookup is
//! scoped to a reporting window (`Interval`).

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier used to look an agent up on the metrics endpoint.
///
/// Serialized in configuration as `{ twitter = "NRNAgents" }` or
/// `{ contract = "0xc004..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKey {
    /// Twitter handle without the leading `@`.
    Twitter(String),
    /// On-chain contract address.
    Contract(String),
}

impl EntityKey {
    pub fn twitter(handle: impl Into<String>) -> Self {
        Self::Twitter(handle.into())
    }

    pub fn contract(address: impl Into<String>) -> Self {
        Self::Contract(address.into())
    }

    /// The raw handle or address.
    pub fn value(&self) -> &str {
        match self {
            Self::Twitter(handle) => handle,
            Self::Contract(address) => address,
        }
    }

    /// Path segment selecting the lookup kind on the metrics endpoint.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Twitter(_) => "twitterUsername",
            Self::Contract(_) => "contractAddress",
        }
    }

    /// Reject blank keys and keys that would break the request path.
    pub fn validate(&self) -> Result<()> {
        let value = self.value();
        if value.trim().is_empty() {
            return Err(CoreError::InvalidEntityKey("key is blank".to_string()));
        }
        if value.contains(['/', '?', '#']) || value.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidEntityKey(format!(
                "{value:?} contains characters not allowed in a path segment"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for EntityKey {
    type Err = CoreError;

    /// `0x`-prefixed input is a contract address, anything else a twitter
    /// handle (a leading `@` is stripped).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let key = if trimmed.starts_with("0x") {
            Self::Contract(trimmed.to_string())
        } else {
            Self::Twitter(trimmed.trim_start_matches('@').to_string())
        };
        key.validate()?;
        Ok(key)
    }
}

/// Reporting window requested from the metrics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "_7Days", alias = "7d")]
    SevenDays,
    #[serde(rename = "_3Days", alias = "3d")]
    ThreeDays,
}

impl Interval {
    /// Value of the `interval` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::SevenDays => "_7Days",
            Self::ThreeDays => "_3Days",
        }
    }

    /// The single fallback window.
    pub fn alternate(&self) -> Self {
        match self {
            Self::SevenDays => Self::ThreeDays,
            Self::ThreeDays => Self::SevenDays,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "_7Days" | "7d" => Ok(Self::SevenDays),
            "_3Days" | "3d" => Ok(Self::ThreeDays),
            other => Err(CoreError::InvalidInterval(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_path_segment() {
        assert_eq!(EntityKey::twitter("NRNAgents").path_segment(), "twitterUsername");
        assert_eq!(EntityKey::contract("0xabc").path_segment(), "contractAddress");
    }

    #[test]
    fn test_entity_key_from_str() {
        let key: EntityKey = "@vitaieth".parse().unwrap();
        assert_eq!(key, EntityKey::twitter("vitaieth"));

        let key: EntityKey = "0xc0041ef357b183448b235a8ea73ce4e4ec8c265f".parse().unwrap();
        assert!(matches!(key, EntityKey::Contract(_)));

        assert!("".parse::<EntityKey>().is_err());
        assert!("a/b".parse::<EntityKey>().is_err());
    }

    #[test]
    fn test_entity_key_config_shape() {
        #[derive(Deserialize)]
        struct Roster {
            roster: Vec<EntityKey>,
        }

        let roster: Roster = toml::from_str(
            r#"roster = [{ twitter = "NRNAgents" }, { contract = "0xabc" }]"#,
        )
        .unwrap();
        assert_eq!(
            roster.roster,
            vec![EntityKey::twitter("NRNAgents"), EntityKey::contract("0xabc")]
        );
    }

    #[test]
    fn test_interval_alternate_is_involution() {
        assert_eq!(Interval::SevenDays.alternate(), Interval::ThreeDays);
        assert_eq!(Interval::ThreeDays.alternate(), Interval::SevenDays);
        assert_eq!(Interval::SevenDays.alternate().alternate(), Interval::SevenDays);
    }

    #[test]
    fn test_interval_query_values() {
        assert_eq!(Interval::default().as_query(), "_7Days");
        assert_eq!("3d".parse::<Interval>().unwrap(), Interval::ThreeDays);
        assert!("_30Days".parse::<Interval>().is_err());
    }
}
