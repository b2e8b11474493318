//! States and their optional capabilities.
//!
//! A plain [`State`] only owns its outgoing transitions. Behavior is added by
//! attaching components rather than by layering types:
//! - an [`ActionBundle`] holding enter, in-state and exit callbacks
//! - a [`Monitor`] recording entry count and entry/exit timestamps

use super::action::{run_actions, Action, ActionContext, ActionResult};
use super::condition::{Condition, EvalContext};
use super::handle::StateId;
use super::transition::Transition;
use super::value::Value;
use std::fmt;
use std::time::Duration;

/// Anything that owns an ordered list of outgoing transitions.
pub trait HasTransitions {
    fn transitions(&self) -> &[Transition];

    /// Valid when every transition resolves inside a layout of
    /// `state_count` states. A sink state with no transitions is valid.
    fn is_valid(&self, state_count: usize) -> bool {
        self.transitions()
            .iter()
            .all(|transition| transition.is_valid(state_count))
    }
}

/// Callback lists for the three lifecycle hooks.
#[derive(Default)]
pub struct ActionBundle {
    pub(crate) entering: Vec<Action>,
    pub(crate) in_state: Vec<Action>,
    pub(crate) exiting: Vec<Action>,
}

impl ActionBundle {
    pub fn len(&self) -> usize {
        self.entering.len() + self.in_state.len() + self.exiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entry/exit bookkeeping read by time- and count-based conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Monitor {
    pub entry_count: u64,
    pub last_entry_time: Option<Duration>,
    pub last_exit_time: Option<Duration>,
}

/// Node of a layout.
pub struct State {
    id: StateId,
    name: String,
    transitions: Vec<Transition>,
    terminal: bool,
    in_state_on_entry: bool,
    in_state_on_exit: bool,
    actions: Option<ActionBundle>,
    monitor: Option<Monitor>,
    custom_value: Option<Value>,
}

impl State {
    pub fn new(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transitions: Vec::new(),
            terminal: false,
            in_state_on_entry: false,
            in_state_on_exit: false,
            actions: None,
            monitor: None,
            custom_value: None,
        }
    }

    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    /// Also run the in-state action right after entering / right before exiting.
    pub fn with_coupling(mut self, on_entry: bool, on_exit: bool) -> Self {
        self.in_state_on_entry = on_entry;
        self.in_state_on_exit = on_exit;
        self
    }

    pub fn with_actions(mut self) -> Self {
        self.actions.get_or_insert_with(ActionBundle::default);
        self
    }

    pub fn with_monitor(mut self) -> Self {
        self.monitor.get_or_insert_with(Monitor::default);
        self
    }

    pub fn with_custom_value(mut self, value: Option<Value>) -> Self {
        self.custom_value = value;
        self
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn has_actions(&self) -> bool {
        self.actions.is_some()
    }

    pub fn is_monitored(&self) -> bool {
        self.monitor.is_some()
    }

    pub fn monitor(&self) -> Option<&Monitor> {
        self.monitor.as_ref()
    }

    pub fn entry_count(&self) -> Option<u64> {
        self.monitor.map(|monitor| monitor.entry_count)
    }

    pub fn last_entry_time(&self) -> Option<Duration> {
        self.monitor.and_then(|monitor| monitor.last_entry_time)
    }

    pub fn last_exit_time(&self) -> Option<Duration> {
        self.monitor.and_then(|monitor| monitor.last_exit_time)
    }

    pub fn custom_value(&self) -> Option<&Value> {
        self.custom_value.as_ref()
    }

    pub fn set_custom_value(&mut self, value: impl Into<Value>) {
        self.custom_value = Some(value.into());
    }

    pub fn push_transition(&mut self, transition: Transition) -> usize {
        self.transitions.push(transition);
        self.transitions.len() - 1
    }

    pub(crate) fn transition_mut(&mut self, slot: usize) -> Option<&mut Transition> {
        self.transitions.get_mut(slot)
    }

    pub(crate) fn actions_mut(&mut self) -> Option<&mut ActionBundle> {
        self.actions.as_mut()
    }

    /// Slot of the first enabled transition, in registration order.
    ///
    /// Scanning stops at the first match, so later conditions are not
    /// evaluated on that tick.
    pub fn has_enabled_transition(
        &self,
        conditions: &mut [Condition],
        ctx: &EvalContext<'_>,
    ) -> Option<usize> {
        self.transitions
            .iter()
            .position(|transition| transition.is_transiting(conditions, ctx))
    }

    /// Stamp entry bookkeeping, run entering callbacks, then the in-state
    /// callbacks when coupled on entry.
    pub(crate) fn execute_entering_action(&mut self, now: Duration) -> ActionResult {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.entry_count += 1;
            monitor.last_entry_time = Some(now);
        }
        self.run_hook(Hook::Entering, now)?;
        if self.in_state_on_entry {
            self.run_hook(Hook::InState, now)?;
        }
        Ok(())
    }

    pub(crate) fn execute_in_state_action(&mut self, now: Duration) -> ActionResult {
        self.run_hook(Hook::InState, now)
    }

    /// Stamp the exit time, run the in-state callbacks when coupled on exit,
    /// then the exiting callbacks.
    pub(crate) fn execute_exiting_action(&mut self, now: Duration) -> ActionResult {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.last_exit_time = Some(now);
        }
        if self.in_state_on_exit {
            self.run_hook(Hook::InState, now)?;
        }
        self.run_hook(Hook::Exiting, now)
    }

    fn run_hook(&mut self, hook: Hook, now: Duration) -> ActionResult {
        let Some(bundle) = self.actions.as_mut() else {
            return Ok(());
        };
        let ctx = ActionContext {
            state: self.id,
            state_name: &self.name,
            now,
            entry_count: self.monitor.map(|monitor| monitor.entry_count),
        };
        let actions = match hook {
            Hook::Entering => &mut bundle.entering,
            Hook::InState => &mut bundle.in_state,
            Hook::Exiting => &mut bundle.exiting,
        };
        run_actions(actions, &ctx)
    }
}

#[derive(Clone, Copy)]
enum Hook {
    Entering,
    InState,
    Exiting,
}

impl HasTransitions for State {
    fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .field("terminal", &self.terminal)
            .field("actions", &self.actions.as_ref().map(ActionBundle::len))
            .field("monitor", &self.monitor)
            .field("custom_value", &self.custom_value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ActionError;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, label: &'static str) -> Action {
        let log = Arc::clone(log);
        Box::new(move |ctx: &ActionContext<'_>| {
            log.lock()
                .unwrap()
                .push(format!("{label}:{:?}", ctx.entry_count));
            Ok(())
        })
    }

    fn wired_state(log: &Log) -> State {
        let mut state = State::new(StateId::new(0), "lamp").with_actions().with_monitor();
        let bundle = state.actions_mut().unwrap();
        bundle.entering.push(recorder(log, "enter"));
        bundle.in_state.push(recorder(log, "in"));
        bundle.exiting.push(recorder(log, "exit"));
        state
    }

    #[test]
    fn entry_updates_monitor_before_callbacks() {
        let log = Log::default();
        let mut state = wired_state(&log);

        state.execute_entering_action(Duration::from_millis(10)).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["enter:Some(1)"]);
        assert_eq!(state.entry_count(), Some(1));
        assert_eq!(state.last_entry_time(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn exit_stamps_exit_time() {
        let log = Log::default();
        let mut state = wired_state(&log);

        state.execute_entering_action(Duration::ZERO).unwrap();
        state.execute_exiting_action(Duration::from_millis(30)).unwrap();

        assert_eq!(state.last_exit_time(), Some(Duration::from_millis(30)));
        assert_eq!(*log.lock().unwrap(), vec!["enter:Some(1)", "exit:Some(1)"]);
    }

    #[test]
    fn coupling_flags_run_in_state_callbacks() {
        let log = Log::default();
        let mut state = wired_state(&log).with_coupling(true, true);

        state.execute_entering_action(Duration::ZERO).unwrap();
        state.execute_exiting_action(Duration::ZERO).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["enter:Some(1)", "in:Some(1)", "in:Some(1)", "exit:Some(1)"]
        );
    }

    #[test]
    fn plain_state_runs_hooks_without_effect() {
        let mut state = State::new(StateId::new(0), "sink");
        assert!(state.execute_entering_action(Duration::ZERO).is_ok());
        assert!(state.execute_in_state_action(Duration::ZERO).is_ok());
        assert!(state.execute_exiting_action(Duration::ZERO).is_ok());
        assert_eq!(state.entry_count(), None);
    }

    #[test]
    fn failing_callback_propagates() {
        let mut state = State::new(StateId::new(0), "broken").with_actions();
        state
            .actions_mut()
            .unwrap()
            .entering
            .push(Box::new(|_: &ActionContext<'_>| Err(ActionError::new("led"))));

        let err = state.execute_entering_action(Duration::ZERO).unwrap_err();
        assert_eq!(err, ActionError::new("led"));
    }

    #[test]
    fn first_enabled_transition_wins() {
        let mut state = State::new(StateId::new(0), "fork");
        state.push_transition(Transition::always(StateId::new(1)));
        state.push_transition(Transition::always(StateId::new(2)));

        let ctx = EvalContext {
            states: &[],
            now: Duration::ZERO,
        };
        assert_eq!(state.has_enabled_transition(&mut [], &ctx), Some(0));
    }

    #[test]
    fn sink_state_is_valid() {
        let state = State::new(StateId::new(0), "sink");
        let ctx = EvalContext {
            states: &[],
            now: Duration::ZERO,
        };
        assert!(state.is_valid(1));
        assert_eq!(state.has_enabled_transition(&mut [], &ctx), None);
    }

    #[test]
    fn dangling_transition_invalidates_state() {
        let mut state = State::new(StateId::new(0), "a");
        state.push_transition(Transition::always(StateId::new(5)));
        assert!(!state.is_valid(2));
    }
}
