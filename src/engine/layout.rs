//! Static description of a machine's graph.

use crate::core::{
    Condition, ConditionId, EvalContext, HasTransitions, SharedClock, State, StateId, TransitionId,
};
use crate::validation::{validate_layout, LayoutViolation};
use std::fmt;
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// The set of states a machine steps over, its conditions, the designated
/// initial state and the clock every timed condition samples.
///
/// A layout is normally produced by `LayoutBuilder::build`, which refuses
/// invalid graphs. [`Layout::from_parts`] assembles one without checks.
pub struct Layout {
    states: Vec<State>,
    conditions: Vec<Condition>,
    initial: StateId,
    clock: SharedClock,
}

impl Layout {
    /// Assemble a layout without validating it.
    pub fn from_parts(
        states: Vec<State>,
        conditions: Vec<Condition>,
        initial: StateId,
        clock: SharedClock,
    ) -> Self {
        Self {
            states,
            conditions,
            initial,
            clock,
        }
    }

    pub fn validate(&self) -> Validation<(), NonEmptyVec<LayoutViolation>> {
        validate_layout(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_success()
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.get_mut(id.index())
    }

    /// Handle of the state with this name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .find(|state| state.name() == name)
            .map(State::id)
    }

    pub fn condition(&self, id: ConditionId) -> Option<&Condition> {
        self.conditions.get(id.index())
    }

    pub fn condition_mut(&mut self, id: ConditionId) -> Option<&mut Condition> {
        self.conditions.get_mut(id.index())
    }

    pub fn conditions_with_ids(&self) -> impl Iterator<Item = (ConditionId, &Condition)> {
        self.conditions
            .iter()
            .enumerate()
            .map(|(index, condition)| (ConditionId::new(index), condition))
    }

    /// Slot of the first enabled transition of `state` at `now`.
    pub(crate) fn first_enabled(&mut self, state: StateId, now: Duration) -> Option<usize> {
        let states = &self.states;
        let conditions = &mut self.conditions;
        let ctx = EvalContext { states, now };
        states
            .get(state.index())?
            .has_enabled_transition(conditions, &ctx)
    }

    pub(crate) fn transition_target(&self, id: TransitionId) -> Option<StateId> {
        self.state(id.source)?
            .transitions()
            .get(id.slot)
            .map(|transition| transition.next_state())
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("states", &self.states)
            .field("conditions", &self.conditions)
            .field("initial", &self.initial)
            .finish()
    }
}
