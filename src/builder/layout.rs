//! Builder for assembling layouts.

use crate::builder::error::BuildError;
use crate::core::{
    ActionContext, ActionResult, Condition, ConditionId, Guard, SharedClock, State, StateId,
    TransitContext, Transition, TransitionId, Value,
};
use crate::engine::Layout;
use crate::validation::rules::into_result;
use std::collections::HashMap;
use std::time::Duration;

/// Options for a new state: flags and optional capabilities.
///
/// # Example
///
/// ```rust
/// use tickwise::builder::StateOptions;
///
/// let options = StateOptions::new("blink_on")
///     .with_actions()
///     .monitored()
///     .in_state_on_entry();
/// assert_eq!(options.name(), "blink_on");
/// ```
#[derive(Clone, Debug, Default)]
pub struct StateOptions {
    name: String,
    terminal: bool,
    in_state_on_entry: bool,
    in_state_on_exit: bool,
    actions: bool,
    monitored: bool,
    custom_value: Option<Value>,
}

impl StateOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entering this state stops the machine.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Also run the in-state action right after entering.
    pub fn in_state_on_entry(mut self) -> Self {
        self.in_state_on_entry = true;
        self
    }

    /// Also run the in-state action right before exiting.
    pub fn in_state_on_exit(mut self) -> Self {
        self.in_state_on_exit = true;
        self
    }

    /// Attach the action capability (enter, in-state and exit callbacks).
    pub fn with_actions(mut self) -> Self {
        self.actions = true;
        self
    }

    /// Attach the monitoring capability (entry count and timestamps).
    pub fn monitored(mut self) -> Self {
        self.monitored = true;
        self
    }

    pub fn custom_value(mut self, value: impl Into<Value>) -> Self {
        self.custom_value = Some(value.into());
        self
    }

    fn into_state(self, id: StateId) -> State {
        let mut state = State::new(id, self.name)
            .with_terminal(self.terminal)
            .with_coupling(self.in_state_on_entry, self.in_state_on_exit)
            .with_custom_value(self.custom_value);
        if self.actions {
            state = state.with_actions();
        }
        if self.monitored {
            state = state.with_monitor();
        }
        state
    }
}

/// Mutable assembly area for a [`Layout`].
///
/// States, conditions and transitions are added one at a time; each call
/// checks its inputs immediately and hands back a handle.
pub struct LayoutBuilder {
    clock: SharedClock,
    states: Vec<State>,
    names: HashMap<String, StateId>,
    conditions: Vec<Condition>,
    initial: Option<StateId>,
}

impl LayoutBuilder {
    /// Create a builder whose conditions sample `clock`.
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            states: Vec::new(),
            names: HashMap::new(),
            conditions: Vec::new(),
            initial: None,
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Add a state. Names must be unique within the layout.
    pub fn add_state(&mut self, options: StateOptions) -> Result<StateId, BuildError> {
        if self.names.contains_key(options.name()) {
            return Err(BuildError::DuplicateState(options.name().to_string()));
        }
        let id = StateId::new(self.states.len());
        self.names.insert(options.name().to_string(), id);
        self.states.push(options.into_state(id));
        Ok(id)
    }

    /// Designate the state the machine enters first.
    pub fn initial(&mut self, state: StateId) -> Result<(), BuildError> {
        self.state(state)?;
        self.initial = Some(state);
        Ok(())
    }

    pub fn state(&self, id: StateId) -> Result<&State, BuildError> {
        self.states
            .get(id.index())
            .ok_or(BuildError::UnknownState(id))
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.names.get(name).copied()
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut State, BuildError> {
        self.states
            .get_mut(id.index())
            .ok_or(BuildError::UnknownState(id))
    }

    /// Fail unless `id` exists and carries the monitoring capability.
    pub(crate) fn require_monitored(&self, id: StateId) -> Result<(), BuildError> {
        let state = self.state(id)?;
        if state.is_monitored() {
            Ok(())
        } else {
            Err(BuildError::NotMonitored {
                state: state.name().to_string(),
            })
        }
    }

    /// Timed condition measuring from the current clock reading.
    pub fn timed(&self, duration: Duration) -> Condition {
        Condition::timed(duration, self.now())
    }

    /// Edge-triggered entry-count condition bound to a monitored state.
    pub fn entry_count(&self, state: StateId, expected_count: u64) -> Result<Condition, BuildError> {
        self.require_monitored(state)?;
        let current = self.state(state)?.entry_count().unwrap_or_default();
        Ok(Condition::state_entry_count(state, expected_count, current))
    }

    /// Install a condition, checking the states it reads.
    pub fn condition(&mut self, condition: Condition) -> Result<ConditionId, BuildError> {
        for bound in condition.bound_states() {
            self.state(bound)?;
        }
        for watched in condition.monitored_states() {
            self.require_monitored(watched)?;
        }
        self.conditions.push(condition);
        Ok(ConditionId::new(self.conditions.len() - 1))
    }

    pub fn condition_mut(&mut self, id: ConditionId) -> Result<&mut Condition, BuildError> {
        self.conditions
            .get_mut(id.index())
            .ok_or(BuildError::UnknownCondition(id))
    }

    /// Append a transition guarded by an installed condition.
    pub fn link(
        &mut self,
        from: StateId,
        to: StateId,
        condition: ConditionId,
    ) -> Result<TransitionId, BuildError> {
        if condition.index() >= self.conditions.len() {
            return Err(BuildError::UnknownCondition(condition));
        }
        self.push_transition(from, to, Guard::When(condition))
    }

    /// Append an unconditional transition.
    pub fn unconditional(&mut self, from: StateId, to: StateId) -> Result<TransitionId, BuildError> {
        self.push_transition(from, to, Guard::Always)
    }

    fn push_transition(
        &mut self,
        from: StateId,
        to: StateId,
        guard: Guard,
    ) -> Result<TransitionId, BuildError> {
        self.state(to)?;
        let slot = self
            .state_mut(from)?
            .push_transition(Transition::new(to, guard));
        Ok(TransitionId { source: from, slot })
    }

    fn transition_mut(&mut self, id: TransitionId) -> Result<&mut Transition, BuildError> {
        self.state_mut(id.source)?
            .transition_mut(id.slot)
            .ok_or(BuildError::UnknownTransition(id))
    }

    /// Attach transit counters to a transition.
    pub fn monitor_transition(&mut self, id: TransitionId) -> Result<(), BuildError> {
        self.transition_mut(id)?.enable_monitor();
        Ok(())
    }

    pub fn add_entering_action<F>(&mut self, state: StateId, action: F) -> Result<(), BuildError>
    where
        F: FnMut(&ActionContext<'_>) -> ActionResult + Send + 'static,
    {
        self.bundle(state, |bundle| bundle.entering.push(Box::new(action)))
    }

    pub fn add_in_state_action<F>(&mut self, state: StateId, action: F) -> Result<(), BuildError>
    where
        F: FnMut(&ActionContext<'_>) -> ActionResult + Send + 'static,
    {
        self.bundle(state, |bundle| bundle.in_state.push(Box::new(action)))
    }

    pub fn add_exiting_action<F>(&mut self, state: StateId, action: F) -> Result<(), BuildError>
    where
        F: FnMut(&ActionContext<'_>) -> ActionResult + Send + 'static,
    {
        self.bundle(state, |bundle| bundle.exiting.push(Box::new(action)))
    }

    /// Register a side effect run while `transition` is taken.
    pub fn add_transiting_action<F>(
        &mut self,
        transition: TransitionId,
        action: F,
    ) -> Result<(), BuildError>
    where
        F: FnMut(&TransitContext) -> ActionResult + Send + 'static,
    {
        self.transition_mut(transition)?
            .add_transiting_action(Box::new(action));
        Ok(())
    }

    fn bundle(
        &mut self,
        state: StateId,
        push: impl FnOnce(&mut crate::core::ActionBundle),
    ) -> Result<(), BuildError> {
        let state = self.state_mut(state)?;
        let name = state.name().to_string();
        match state.actions_mut() {
            Some(bundle) => {
                push(bundle);
                Ok(())
            }
            None => Err(BuildError::MissingActions { state: name }),
        }
    }

    /// Validate and produce the layout.
    pub fn build(self) -> Result<Layout, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let layout = Layout::from_parts(self.states, self.conditions, initial, self.clock);
        into_result(layout.validate()).map_err(BuildError::InvalidLayout)?;
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HasTransitions, ManualClock};

    fn builder() -> LayoutBuilder {
        LayoutBuilder::new(ManualClock::new().shared())
    }

    #[test]
    fn builder_validates_required_fields() {
        let mut builder = builder();
        builder.add_state(StateOptions::new("only")).unwrap();
        assert_eq!(builder.build().unwrap_err(), BuildError::MissingInitialState);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut builder = builder();
        builder.add_state(StateOptions::new("on")).unwrap();
        assert_eq!(
            builder.add_state(StateOptions::new("on")),
            Err(BuildError::DuplicateState("on".to_string()))
        );
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut builder = builder();
        let a = builder.add_state(StateOptions::new("a")).unwrap();
        let ghost = StateId::new(5);

        assert_eq!(builder.initial(ghost), Err(BuildError::UnknownState(ghost)));
        assert_eq!(
            builder.unconditional(a, ghost),
            Err(BuildError::UnknownState(ghost))
        );
        assert_eq!(
            builder.link(a, a, ConditionId::new(0)),
            Err(BuildError::UnknownCondition(ConditionId::new(0)))
        );
    }

    #[test]
    fn actions_require_the_action_capability() {
        let mut builder = builder();
        let plain = builder.add_state(StateOptions::new("plain")).unwrap();
        let result = builder.add_entering_action(plain, |_: &ActionContext<'_>| Ok(()));
        assert_eq!(
            result,
            Err(BuildError::MissingActions {
                state: "plain".to_string()
            })
        );
    }

    #[test]
    fn state_bound_conditions_require_monitoring() {
        let mut builder = builder();
        let plain = builder.add_state(StateOptions::new("plain")).unwrap();
        let result = builder.condition(Condition::state_entry_duration(
            plain,
            Duration::from_secs(1),
        ));
        assert_eq!(
            result,
            Err(BuildError::NotMonitored {
                state: "plain".to_string()
            })
        );
        assert!(builder.entry_count(plain, 2).is_err());
    }

    #[test]
    fn options_shape_the_state() {
        let mut builder = builder();
        let id = builder
            .add_state(
                StateOptions::new("sink")
                    .terminal()
                    .with_actions()
                    .monitored()
                    .custom_value(true),
            )
            .unwrap();

        let state = builder.state(id).unwrap();
        assert!(state.is_terminal());
        assert!(state.has_actions());
        assert!(state.is_monitored());
        assert_eq!(state.custom_value(), Some(&Value::Bool(true)));
        assert_eq!(builder.state_id("sink"), Some(id));
    }

    #[test]
    fn transitions_keep_registration_order() {
        let mut builder = builder();
        let a = builder.add_state(StateOptions::new("a")).unwrap();
        let b = builder.add_state(StateOptions::new("b")).unwrap();
        let c = builder.add_state(StateOptions::new("c")).unwrap();

        let first = builder.unconditional(a, b).unwrap();
        let second = builder.unconditional(a, c).unwrap();
        builder.initial(a).unwrap();

        assert_eq!(first.slot, 0);
        assert_eq!(second.slot, 1);
        let layout = builder.build().unwrap();
        let targets: Vec<_> = layout
            .state(a)
            .unwrap()
            .transitions()
            .iter()
            .map(|t| t.next_state())
            .collect();
        assert_eq!(targets, vec![b, c]);
    }

    #[test]
    fn monitor_transition_rejects_unknown_slot() {
        let mut builder = builder();
        let a = builder.add_state(StateOptions::new("a")).unwrap();
        let missing = TransitionId { source: a, slot: 3 };
        assert_eq!(
            builder.monitor_transition(missing),
            Err(BuildError::UnknownTransition(missing))
        );
    }
}
