//! Conditions guarding transitions.
//!
//! A condition is a boolean predicate with an inversion flag:
//! `evaluate() = compare() XOR inverse`. The set of predicates is closed, so
//! the engine only ever needs [`Condition::evaluate`].

use super::handle::StateId;
use super::keycode::{Debounce, Keycode, KeycodeSource, UnknownKeycode};
use super::state::State;
use super::value::{SharedValue, Value};
use std::fmt;
use std::time::Duration;

/// Everything a condition may read while it is evaluated.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub states: &'a [State],
    pub now: Duration,
}

impl<'a> EvalContext<'a> {
    fn state(&self, id: StateId) -> Option<&'a State> {
        self.states.get(id.index())
    }
}

/// Variant-specific predicate of a [`Condition`].
pub enum ConditionKind {
    AlwaysTrue,
    /// Held value equals the expected value.
    Value {
        held: SharedValue,
        expected: Value,
    },
    /// At least `duration` has elapsed since `reference`.
    Timed {
        duration: Duration,
        reference: Duration,
    },
    /// The bound state's current dwell time is at least `duration`.
    StateEntryDuration {
        state: StateId,
        duration: Duration,
    },
    /// Edge-triggered: fires once the bound state has been entered more than
    /// `period` times since `reference`, then rebases `reference`.
    StateEntryCount {
        state: StateId,
        period: u64,
        reference: u64,
    },
    /// The bound state's custom value equals the expected value.
    StateValue {
        state: StateId,
        expected: Value,
    },
    /// The remote reports `expected`; a held key fires once.
    ///
    /// The debounce only re-arms when an evaluation sees another reading.
    /// A state stops scanning at its first enabled transition, so a keycode
    /// link registered after a transition that keeps winning does not see
    /// the key being released, and a new press is not reported until it
    /// does. Register keycode links first when every press matters.
    RemoteKeycode {
        source: Box<dyn KeycodeSource>,
        expected: Keycode,
        debounce: Debounce,
    },
    AllOf(Vec<Condition>),
    AnyOf(Vec<Condition>),
    NoneOf(Vec<Condition>),
}

/// Boolean predicate guarding a transition.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{Condition, EvalContext, SharedValue};
/// use std::time::Duration;
///
/// let armed = SharedValue::new(false);
/// let mut condition = Condition::value(armed.clone(), true);
/// let ctx = EvalContext { states: &[], now: Duration::ZERO };
///
/// assert!(!condition.evaluate(&ctx));
/// armed.set(true);
/// assert!(condition.evaluate(&ctx));
/// ```
pub struct Condition {
    kind: ConditionKind,
    inverse: bool,
}

impl Condition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            inverse: false,
        }
    }

    pub fn always() -> Self {
        Self::new(ConditionKind::AlwaysTrue)
    }

    pub fn value(held: SharedValue, expected: impl Into<Value>) -> Self {
        Self::new(ConditionKind::Value {
            held,
            expected: expected.into(),
        })
    }

    /// Timed condition measuring from `reference`, normally the clock reading
    /// at construction.
    pub fn timed(duration: Duration, reference: Duration) -> Self {
        Self::new(ConditionKind::Timed {
            duration,
            reference,
        })
    }

    pub fn state_entry_duration(state: StateId, duration: Duration) -> Self {
        Self::new(ConditionKind::StateEntryDuration { state, duration })
    }

    /// Entry-count condition firing when the state's entry count moves past
    /// `expected_count`, where `current_count` is the count right now.
    pub fn state_entry_count(state: StateId, expected_count: u64, current_count: u64) -> Self {
        Self::new(ConditionKind::StateEntryCount {
            state,
            period: expected_count.saturating_sub(current_count),
            reference: current_count,
        })
    }

    pub fn state_value(state: StateId, expected: impl Into<Value>) -> Self {
        Self::new(ConditionKind::StateValue {
            state,
            expected: expected.into(),
        })
    }

    /// Keycode-equality condition. Fails on an unrecognized key name.
    pub fn remote_keycode(
        source: impl KeycodeSource + 'static,
        key: &str,
    ) -> Result<Self, UnknownKeycode> {
        let expected = key.parse::<Keycode>()?;
        Ok(Self::new(ConditionKind::RemoteKeycode {
            source: Box::new(source),
            expected,
            debounce: Debounce::default(),
        }))
    }

    pub fn all(children: Vec<Condition>) -> Self {
        Self::new(ConditionKind::AllOf(children))
    }

    pub fn any(children: Vec<Condition>) -> Self {
        Self::new(ConditionKind::AnyOf(children))
    }

    pub fn none(children: Vec<Condition>) -> Self {
        Self::new(ConditionKind::NoneOf(children))
    }

    /// Flip the result of this condition.
    pub fn inverted(mut self) -> Self {
        self.inverse = !self.inverse;
        self
    }

    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    pub fn inverse(&self) -> bool {
        self.inverse
    }

    pub fn set_inverse(&mut self, inverse: bool) {
        self.inverse = inverse;
    }

    /// Current result of the predicate, including inversion.
    pub fn evaluate(&mut self, ctx: &EvalContext<'_>) -> bool {
        self.compare(ctx) ^ self.inverse
    }

    fn compare(&mut self, ctx: &EvalContext<'_>) -> bool {
        match &mut self.kind {
            ConditionKind::AlwaysTrue => true,
            ConditionKind::Value { held, expected } => held.matches(expected),
            ConditionKind::Timed {
                duration,
                reference,
            } => ctx.now.saturating_sub(*reference) >= *duration,
            ConditionKind::StateEntryDuration { state, duration } => ctx
                .state(*state)
                .and_then(State::last_entry_time)
                .is_some_and(|entered| ctx.now.saturating_sub(entered) >= *duration),
            ConditionKind::StateEntryCount {
                state,
                period,
                reference,
            } => {
                let Some(count) = ctx.state(*state).and_then(State::entry_count) else {
                    return false;
                };
                if count.saturating_sub(*reference) > *period {
                    *reference = count;
                    true
                } else {
                    false
                }
            }
            ConditionKind::StateValue { state, expected } => ctx
                .state(*state)
                .and_then(State::custom_value)
                .is_some_and(|value| *value == *expected),
            ConditionKind::RemoteKeycode {
                source,
                expected,
                debounce,
            } => {
                let reading = source.current_code();
                debounce.edge(reading, *expected)
            }
            ConditionKind::AllOf(children) => {
                // Every child is evaluated so edge-triggered children see each tick.
                children
                    .iter_mut()
                    .fold(true, |acc, child| child.evaluate(ctx) && acc)
            }
            ConditionKind::AnyOf(children) => children
                .iter_mut()
                .fold(false, |acc, child| child.evaluate(ctx) || acc),
            ConditionKind::NoneOf(children) => !children
                .iter_mut()
                .fold(false, |acc, child| child.evaluate(ctx) || acc),
        }
    }

    /// Retune the duration of a timed or dwell-time condition.
    /// Returns false when this condition has no duration.
    pub fn set_duration(&mut self, new_duration: Duration) -> bool {
        match &mut self.kind {
            ConditionKind::Timed { duration, .. }
            | ConditionKind::StateEntryDuration { duration, .. } => {
                *duration = new_duration;
                true
            }
            _ => false,
        }
    }

    /// Retune the expected value of a value-comparing condition.
    /// Returns false when this condition compares no value.
    pub fn set_expected(&mut self, new_expected: impl Into<Value>) -> bool {
        match &mut self.kind {
            ConditionKind::Value { expected, .. } | ConditionKind::StateValue { expected, .. } => {
                *expected = new_expected.into();
                true
            }
            _ => false,
        }
    }

    /// Re-stamp the reference instant of a timed condition.
    /// Returns false for every other kind.
    pub fn reset(&mut self, now: Duration) -> bool {
        match &mut self.kind {
            ConditionKind::Timed { reference, .. } => {
                *reference = now;
                true
            }
            _ => false,
        }
    }

    /// States this condition reads, including those of nested children.
    pub fn bound_states(&self) -> Vec<StateId> {
        match &self.kind {
            ConditionKind::StateEntryDuration { state, .. }
            | ConditionKind::StateEntryCount { state, .. }
            | ConditionKind::StateValue { state, .. } => vec![*state],
            ConditionKind::AllOf(children)
            | ConditionKind::AnyOf(children)
            | ConditionKind::NoneOf(children) => {
                children.iter().flat_map(Condition::bound_states).collect()
            }
            _ => Vec::new(),
        }
    }

    /// States that must carry monitoring for this condition to work.
    pub(crate) fn monitored_states(&self) -> Vec<StateId> {
        match &self.kind {
            ConditionKind::StateEntryDuration { state, .. }
            | ConditionKind::StateEntryCount { state, .. } => vec![*state],
            ConditionKind::AllOf(children)
            | ConditionKind::AnyOf(children)
            | ConditionKind::NoneOf(children) => {
                children.iter().flat_map(Condition::monitored_states).collect()
            }
            _ => Vec::new(),
        }
    }

    fn label(&self) -> &'static str {
        match &self.kind {
            ConditionKind::AlwaysTrue => "AlwaysTrue",
            ConditionKind::Value { .. } => "Value",
            ConditionKind::Timed { .. } => "Timed",
            ConditionKind::StateEntryDuration { .. } => "StateEntryDuration",
            ConditionKind::StateEntryCount { .. } => "StateEntryCount",
            ConditionKind::StateValue { .. } => "StateValue",
            ConditionKind::RemoteKeycode { .. } => "RemoteKeycode",
            ConditionKind::AllOf(_) => "All",
            ConditionKind::AnyOf(_) => "Any",
            ConditionKind::NoneOf(_) => "None",
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("kind", &self.label())
            .field("inverse", &self.inverse)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn at(now: Duration) -> EvalContext<'static> {
        EvalContext { states: &[], now }
    }

    #[test]
    fn always_true_respects_inversion() {
        let ctx = at(Duration::ZERO);
        assert!(Condition::always().evaluate(&ctx));
        assert!(!Condition::always().inverted().evaluate(&ctx));
    }

    #[test]
    fn timed_is_inclusive_at_the_boundary() {
        let mut timed = Condition::timed(Duration::from_millis(500), Duration::from_millis(100));

        assert!(!timed.evaluate(&at(Duration::from_millis(599))));
        assert!(timed.evaluate(&at(Duration::from_millis(600))));
        assert!(timed.evaluate(&at(Duration::from_secs(10))));
    }

    #[test]
    fn timed_reset_restamps_reference() {
        let mut timed = Condition::timed(Duration::from_millis(200), Duration::ZERO);
        assert!(timed.evaluate(&at(Duration::from_millis(300))));

        assert!(timed.reset(Duration::from_millis(300)));
        assert!(!timed.evaluate(&at(Duration::from_millis(400))));
        assert!(timed.evaluate(&at(Duration::from_millis(500))));
    }

    #[test]
    fn value_condition_tracks_held_cell() {
        let cell = SharedValue::new("idle");
        let mut condition = Condition::value(cell.clone(), "go");
        let ctx = at(Duration::ZERO);

        assert!(!condition.evaluate(&ctx));
        cell.set("go");
        assert!(condition.evaluate(&ctx));
    }

    #[test]
    fn composites_combine_children() {
        let ctx = at(Duration::ZERO);
        let yes = || Condition::always();
        let no = || Condition::always().inverted();

        assert!(Condition::all(vec![yes(), yes()]).evaluate(&ctx));
        assert!(!Condition::all(vec![yes(), no()]).evaluate(&ctx));
        assert!(Condition::any(vec![no(), yes()]).evaluate(&ctx));
        assert!(!Condition::any(vec![no(), no()]).evaluate(&ctx));
        assert!(Condition::none(vec![no(), no()]).evaluate(&ctx));
        assert!(!Condition::none(vec![no(), yes()]).evaluate(&ctx));
    }

    #[test]
    fn empty_composites_follow_boolean_identities() {
        let ctx = at(Duration::ZERO);
        assert!(Condition::all(Vec::new()).evaluate(&ctx));
        assert!(!Condition::any(Vec::new()).evaluate(&ctx));
        assert!(Condition::none(Vec::new()).evaluate(&ctx));
    }

    #[test]
    fn keycode_condition_rejects_unknown_key() {
        let result = Condition::remote_keycode(|| -> Option<Keycode> { None }, "volume_up");
        assert!(result.is_err());
    }

    #[test]
    fn keycode_debounce_is_per_instance() {
        let ctx = at(Duration::ZERO);
        let mut first = Condition::remote_keycode(|| Some(Keycode::Ok), "ok").unwrap();
        let mut second = Condition::remote_keycode(|| Some(Keycode::Ok), "ok").unwrap();

        assert!(first.evaluate(&ctx));
        assert!(!first.evaluate(&ctx));
        // The second instance has not consumed the press yet.
        assert!(second.evaluate(&ctx));
    }

    #[test]
    fn keycode_rearms_only_on_an_observed_release() {
        let ctx = at(Duration::ZERO);
        let held = Arc::new(Mutex::new(Some(Keycode::Up)));
        let reading = Arc::clone(&held);
        let mut condition =
            Condition::remote_keycode(move || *reading.lock().unwrap(), "up").unwrap();

        assert!(condition.evaluate(&ctx));
        // Released and pressed again between two evaluations.
        *held.lock().unwrap() = None;
        *held.lock().unwrap() = Some(Keycode::Up);
        assert!(!condition.evaluate(&ctx));

        *held.lock().unwrap() = None;
        assert!(!condition.evaluate(&ctx));
        *held.lock().unwrap() = Some(Keycode::Up);
        assert!(condition.evaluate(&ctx));
    }

    #[test]
    fn retuning_only_applies_to_matching_kinds() {
        let mut timed = Condition::timed(Duration::from_secs(1), Duration::ZERO);
        assert!(timed.set_duration(Duration::from_secs(2)));
        assert!(!timed.set_expected(json!(1)));

        let mut state_value = Condition::state_value(StateId::new(0), true);
        assert!(state_value.set_expected(false));
        assert!(!state_value.set_duration(Duration::from_secs(1)));
        assert!(!state_value.reset(Duration::ZERO));
    }

    #[test]
    fn bound_states_include_nested_children() {
        let condition = Condition::any(vec![
            Condition::state_value(StateId::new(1), true),
            Condition::all(vec![Condition::state_entry_duration(
                StateId::new(4),
                Duration::from_secs(1),
            )]),
        ]);

        assert_eq!(condition.bound_states(), vec![StateId::new(1), StateId::new(4)]);
        assert_eq!(condition.monitored_states(), vec![StateId::new(4)]);
    }

    #[test]
    fn debug_shows_kind_label() {
        let condition = Condition::always().inverted();
        assert_eq!(
            format!("{condition:?}"),
            "Condition { kind: \"AlwaysTrue\", inverse: true }"
        );
    }
}
