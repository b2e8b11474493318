//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables of a [`FiniteStateMachine`](crate::engine::FiniteStateMachine).
///
/// Every field has a default, so a partial document deserializes.
///
/// # Example
///
/// ```rust
/// use tickwise::engine::EngineConfig;
/// use std::time::Duration;
///
/// let config: EngineConfig = serde_json::from_str(
///     r#"{ "poll_interval": { "secs": 0, "nanos": 50000000 } }"#,
/// ).unwrap();
///
/// assert_eq!(config.poll_interval, Some(Duration::from_millis(50)));
/// assert_eq!(config.history_capacity, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of transitions kept in the history; 0 disables recording.
    pub history_capacity: usize,

    /// Pause between ticks inside `run`. `None` polls in a tight loop.
    pub poll_interval: Option<Duration>,

    /// Budget applied by `run` when the caller passes none.
    pub default_time_budget: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 64,
            poll_interval: None,
            default_time_budget: None,
        }
    }
}

impl EngineConfig {
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn default_time_budget(mut self, budget: Duration) -> Self {
        self.default_time_budget = Some(budget);
        self
    }
}
