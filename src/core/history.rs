//! Transition history tracking.
//!
//! The engine records every transition it takes so callers can inspect or
//! dump the path a machine followed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single transition taken by the engine.
///
/// # Example
///
/// ```rust
/// use tickwise::core::StateTransition;
/// use chrono::Utc;
/// use std::time::Duration;
///
/// let transition = StateTransition {
///     from: "off".to_string(),
///     to: "on".to_string(),
///     at: Duration::from_millis(250),
///     timestamp: Utc::now(),
///     forced: true,
/// };
/// assert!(transition.forced);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Name of the state being left
    pub from: String,
    /// Name of the state being entered
    pub to: String,
    /// Monotonic clock reading when the transition ran
    pub at: Duration,
    /// Wall-clock time of the transition
    pub timestamp: DateTime<Utc>,
    /// True when the transition was commanded through `transit_to`
    pub forced: bool,
}

/// Bounded, ordered history of transitions.
///
/// Once `capacity` records are held, recording drops the oldest one.
/// A capacity of zero disables recording.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{StateHistory, StateTransition};
/// use chrono::Utc;
/// use std::time::Duration;
///
/// let mut history = StateHistory::with_capacity(8);
/// for (from, to) in [("off", "blink_on"), ("blink_on", "blink_off")] {
///     history.record(StateTransition {
///         from: from.to_string(),
///         to: to.to_string(),
///         at: Duration::ZERO,
///         timestamp: Utc::now(),
///         forced: false,
///     });
/// }
///
/// assert_eq!(history.get_path(), vec!["off", "blink_on", "blink_off"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    capacity: usize,
    transitions: VecDeque<StateTransition>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl StateHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, transition: StateTransition) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Names of the states traversed: the first recorded source, then the
    /// destination of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.transitions.iter().map(|t| t.to.as_str()));
        path
    }

    /// Monotonic span between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.front()?;
        let last = self.transitions.back()?;
        Some(last.at.saturating_sub(first.at))
    }

    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: &str, to: &str, at_ms: u64) -> StateTransition {
        StateTransition {
            from: from.to_string(),
            to: to.to_string(),
            at: Duration::from_millis(at_ms),
            timestamp: Utc::now(),
            forced: false,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::default();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let mut history = StateHistory::default();
        history.record(transition("off", "on", 0));
        history.record(transition("on", "off", 100));

        assert_eq!(history.get_path(), vec!["off", "on", "off"]);
    }

    #[test]
    fn duration_uses_monotonic_readings() {
        let mut history = StateHistory::default();
        history.record(transition("a", "b", 250));
        history.record(transition("b", "c", 1_000));

        assert_eq!(history.duration(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let mut history = StateHistory::default();
        history.record(transition("a", "b", 40));
        assert_eq!(history.duration(), Some(Duration::ZERO));
    }

    #[test]
    fn capacity_drops_oldest_records() {
        let mut history = StateHistory::with_capacity(2);
        history.record(transition("a", "b", 0));
        history.record(transition("b", "c", 1));
        history.record(transition("c", "d", 2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get_path(), vec!["b", "c", "d"]);
    }

    #[test]
    fn zero_capacity_disables_recording() {
        let mut history = StateHistory::with_capacity(0);
        history.record(transition("a", "b", 0));
        assert!(history.is_empty());
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::default();
        history.record(transition("off", "on", 10));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.last(), history.last());
    }
}
