//! Engine configuration.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_capacity() -> usize {
    crate::history::DEFAULT_HISTORY_CAPACITY
}

fn default_interval_secs() -> u64 {
    300
}

/// History retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Snapshots kept per entity, oldest evicted first.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.capacity == 0 {
            return Err(EngineError::ConfigError(
                "history.capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scheduler timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Sleep between the end of one cycle and the start of the next.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.interval_secs == 0 {
            return Err(EngineError::ConfigError(
                "scheduler.interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
