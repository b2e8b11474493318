//! Transitions between states.

use super::action::{run_transit_actions, ActionResult, TransitAction, TransitContext};
use super::condition::{Condition, EvalContext};
use super::handle::{ConditionId, StateId};
use std::fmt;
use std::time::Duration;

/// What enables a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    /// Unconditionally enabled.
    Always,
    /// Enabled while the referenced condition evaluates true.
    When(ConditionId),
}

/// Counters of a monitored transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitMonitor {
    pub transit_count: u64,
    pub last_transit_time: Option<Duration>,
}

/// Outgoing edge owned by its source state.
///
/// The destination is a handle into the layout, so a transition can never
/// exist without one.
pub struct Transition {
    target: StateId,
    guard: Guard,
    actions: Vec<TransitAction>,
    monitor: Option<TransitMonitor>,
}

impl Transition {
    pub fn new(target: StateId, guard: Guard) -> Self {
        Self {
            target,
            guard,
            actions: Vec::new(),
            monitor: None,
        }
    }

    pub fn always(target: StateId) -> Self {
        Self::new(target, Guard::Always)
    }

    pub fn when(target: StateId, condition: ConditionId) -> Self {
        Self::new(target, Guard::When(condition))
    }

    /// Attach transit counters.
    pub fn monitored(mut self) -> Self {
        self.monitor.get_or_insert_with(TransitMonitor::default);
        self
    }

    pub fn next_state(&self) -> StateId {
        self.target
    }

    pub fn guard(&self) -> Guard {
        self.guard
    }

    pub fn monitor(&self) -> Option<&TransitMonitor> {
        self.monitor.as_ref()
    }

    pub(crate) fn enable_monitor(&mut self) {
        self.monitor.get_or_insert_with(TransitMonitor::default);
    }

    pub fn add_transiting_action(&mut self, action: TransitAction) {
        self.actions.push(action);
    }

    /// A transition is valid when its destination resolves inside a layout of
    /// `state_count` states.
    pub fn is_valid(&self, state_count: usize) -> bool {
        self.target.index() < state_count
    }

    /// Whether this edge is currently enabled.
    ///
    /// A guard naming a missing condition is never enabled; layout validation
    /// rejects that case before a machine can run.
    pub fn is_transiting(&self, conditions: &mut [Condition], ctx: &EvalContext<'_>) -> bool {
        match self.guard {
            Guard::Always => true,
            Guard::When(id) => conditions
                .get_mut(id.index())
                .is_some_and(|condition| condition.evaluate(ctx)),
        }
    }

    /// Stamp the transit counters, then run side effects in registration order.
    pub(crate) fn execute_transiting_action(
        &mut self,
        from: StateId,
        now: Duration,
    ) -> ActionResult {
        let transit_count = self.monitor.as_mut().map(|monitor| {
            monitor.transit_count += 1;
            monitor.last_transit_time = Some(now);
            monitor.transit_count
        });
        let ctx = TransitContext {
            from,
            to: self.target,
            now,
            transit_count,
        };
        run_transit_actions(&mut self.actions, &ctx)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("guard", &self.guard)
            .field("actions", &self.actions.len())
            .field("monitor", &self.monitor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn always_transition_is_enabled() {
        let transition = Transition::always(StateId::new(1));
        let ctx = EvalContext {
            states: &[],
            now: Duration::ZERO,
        };
        assert!(transition.is_transiting(&mut [], &ctx));
    }

    #[test]
    fn conditional_transition_delegates_to_condition() {
        let mut conditions = vec![Condition::always().inverted(), Condition::always()];
        let ctx = EvalContext {
            states: &[],
            now: Duration::ZERO,
        };

        let blocked = Transition::when(StateId::new(0), ConditionId::new(0));
        let open = Transition::when(StateId::new(0), ConditionId::new(1));
        let dangling = Transition::when(StateId::new(0), ConditionId::new(9));

        assert!(!blocked.is_transiting(&mut conditions, &ctx));
        assert!(open.is_transiting(&mut conditions, &ctx));
        assert!(!dangling.is_transiting(&mut conditions, &ctx));
    }

    #[test]
    fn validity_depends_on_destination() {
        let transition = Transition::always(StateId::new(2));
        assert!(transition.is_valid(3));
        assert!(!transition.is_valid(2));
    }

    #[test]
    fn monitor_is_stamped_before_side_effects() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut transition = Transition::always(StateId::new(1)).monitored();
        let sink = Arc::clone(&seen);
        transition.add_transiting_action(Box::new(move |ctx: &TransitContext| {
            sink.lock().unwrap().push(ctx.transit_count);
            Ok(())
        }));

        transition
            .execute_transiting_action(StateId::new(0), Duration::from_millis(5))
            .unwrap();
        transition
            .execute_transiting_action(StateId::new(0), Duration::from_millis(9))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some(1), Some(2)]);
        let monitor = transition.monitor().unwrap();
        assert_eq!(monitor.transit_count, 2);
        assert_eq!(monitor.last_transit_time, Some(Duration::from_millis(9)));
    }

    #[test]
    fn unmonitored_transition_reports_no_count() {
        let seen = Arc::new(Mutex::new(None));
        let mut transition = Transition::always(StateId::new(1));
        let sink = Arc::clone(&seen);
        transition.add_transiting_action(Box::new(move |ctx: &TransitContext| {
            *sink.lock().unwrap() = Some(ctx.transit_count);
            Ok(())
        }));

        transition
            .execute_transiting_action(StateId::new(0), Duration::ZERO)
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(None));
    }
}
