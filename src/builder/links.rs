//! Link builders: one call installs a condition and the transition it guards.

use super::error::BuildError;
use super::layout::LayoutBuilder;
use crate::core::{Condition, ConditionId, KeycodeSource, StateId, TransitionId, Value};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handles produced by a link builder.
///
/// Keep `condition` to retune the link later, for example with
/// [`Condition::set_duration`] through `FiniteStateMachine::condition_mut`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub transition: TransitionId,
    pub condition: ConditionId,
}

impl LayoutBuilder {
    fn install(
        &mut self,
        from: StateId,
        to: StateId,
        condition: Condition,
    ) -> Result<Link, BuildError> {
        self.state(from)?;
        self.state(to)?;
        let condition = self.condition(condition)?;
        let transition = self.link(from, to, condition)?;
        Ok(Link {
            transition,
            condition,
        })
    }

    /// Link guarded by an always-true condition.
    pub fn always_link(&mut self, from: StateId, to: StateId) -> Result<Link, BuildError> {
        self.install(from, to, Condition::always())
    }

    /// Leave `from` once it has been occupied for `duration`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tickwise::builder::{LayoutBuilder, StateOptions};
    /// use tickwise::core::ManualClock;
    /// use std::time::Duration;
    ///
    /// let mut builder = LayoutBuilder::new(ManualClock::new().shared());
    /// let on = builder.add_state(StateOptions::new("on").monitored()).unwrap();
    /// let off = builder.add_state(StateOptions::new("off")).unwrap();
    /// let link = builder.timed_link(on, off, Duration::from_millis(250)).unwrap();
    /// assert_eq!(link.transition.source, on);
    /// ```
    pub fn timed_link(
        &mut self,
        from: StateId,
        to: StateId,
        duration: Duration,
    ) -> Result<Link, BuildError> {
        self.require_monitored(from)?;
        self.install(from, to, Condition::state_entry_duration(from, duration))
    }

    /// Leave `from` once `owner` has been occupied for `duration`.
    ///
    /// Several branches measuring the same owner expire together, whichever
    /// of them is current.
    pub fn duration_owner_link(
        &mut self,
        from: StateId,
        to: StateId,
        owner: StateId,
        duration: Duration,
    ) -> Result<Link, BuildError> {
        self.require_monitored(owner)?;
        self.install(from, to, Condition::state_entry_duration(owner, duration))
    }

    /// Leave `from` while its custom value equals `expected`.
    pub fn value_link(
        &mut self,
        from: StateId,
        to: StateId,
        expected: impl Into<Value>,
    ) -> Result<Link, BuildError> {
        self.install(from, to, Condition::state_value(from, expected))
    }

    /// Leave `from` once `watched` has been entered `expected_count` more
    /// times than it had been when the link was built, plus one.
    pub fn count_link(
        &mut self,
        from: StateId,
        to: StateId,
        watched: StateId,
        expected_count: u64,
    ) -> Result<Link, BuildError> {
        let condition = self.entry_count(watched, expected_count)?;
        self.install(from, to, condition)
    }

    /// Leave `from` on the press of the named remote key.
    pub fn keycode_link(
        &mut self,
        from: StateId,
        to: StateId,
        source: impl KeycodeSource + 'static,
        key: &str,
    ) -> Result<Link, BuildError> {
        let condition = Condition::remote_keycode(source, key)?;
        self.install(from, to, condition)
    }
}
