//! Layout validation rules.

use crate::core::{Guard, HasTransitions};
use crate::engine::Layout;
use crate::validation::violations::LayoutViolation;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<LayoutViolation>>;

/// Validate a layout, accumulating ALL violations.
///
/// A layout is valid when its initial state belongs to it, every state sits
/// at the slot its handle names, names are unique, every transition resolves
/// its destination and condition, and every state-bound condition reads a
/// state of the layout (monitored when it reads counts or timestamps).
pub fn validate_layout(layout: &Layout) -> Check {
    let mut checks: Vec<Check> = Vec::new();
    let state_count = layout.states().len();

    checks.push(if layout.initial().index() < state_count {
        Validation::success(())
    } else {
        Validation::fail(LayoutViolation::MissingInitialState {
            initial: layout.initial(),
            state_count,
        })
    });

    let mut seen_names = HashSet::new();
    for (slot, state) in layout.states().iter().enumerate() {
        if state.id().index() != slot {
            checks.push(Validation::fail(LayoutViolation::MisplacedState {
                state: state.name().to_string(),
                slot,
                id: state.id(),
            }));
        }
        if !seen_names.insert(state.name()) {
            checks.push(Validation::fail(LayoutViolation::DuplicateStateName {
                state: state.name().to_string(),
            }));
        }
        for (index, transition) in state.transitions().iter().enumerate() {
            if !transition.is_valid(state_count) {
                checks.push(Validation::fail(LayoutViolation::DanglingTransition {
                    state: state.name().to_string(),
                    slot: index,
                    target: transition.next_state(),
                }));
            }
            if let Guard::When(condition) = transition.guard() {
                if layout.condition(condition).is_none() {
                    checks.push(Validation::fail(LayoutViolation::UnknownCondition {
                        state: state.name().to_string(),
                        slot: index,
                        condition,
                    }));
                }
            }
        }
    }

    for (id, condition) in layout.conditions_with_ids() {
        for bound in condition.bound_states() {
            if layout.state(bound).is_none() {
                checks.push(Validation::fail(LayoutViolation::UnboundCondition {
                    condition: id,
                    state: bound,
                }));
            }
        }
        for watched in condition.monitored_states() {
            if let Some(state) = layout.state(watched) {
                if !state.is_monitored() {
                    checks.push(Validation::fail(LayoutViolation::UnmonitoredState {
                        condition: id,
                        state: state.name().to_string(),
                    }));
                }
            }
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Collapse a validation into a `Result` carrying every violation.
pub(crate) fn into_result(check: Check) -> Result<(), Vec<LayoutViolation>> {
    match check {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Condition, ConditionId, ManualClock, State, StateId, Transition};

    fn layout(states: Vec<State>, conditions: Vec<Condition>, initial: usize) -> Layout {
        Layout::from_parts(
            states,
            conditions,
            StateId::new(initial),
            ManualClock::new().shared(),
        )
    }

    #[test]
    fn sink_only_layout_is_valid() {
        let layout = layout(vec![State::new(StateId::new(0), "sink")], Vec::new(), 0);
        assert!(validate_layout(&layout).is_success());
    }

    #[test]
    fn missing_initial_state_is_reported() {
        let layout = layout(vec![State::new(StateId::new(0), "a")], Vec::new(), 1);
        let violations = into_result(validate_layout(&layout)).unwrap_err();
        assert_eq!(
            violations,
            vec![LayoutViolation::MissingInitialState {
                initial: StateId::new(1),
                state_count: 1,
            }]
        );
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut a = State::new(StateId::new(0), "a");
        a.push_transition(Transition::always(StateId::new(7)));
        a.push_transition(Transition::when(StateId::new(1), ConditionId::new(3)));
        let b = State::new(StateId::new(1), "a");
        let conditions = vec![Condition::state_entry_duration(
            StateId::new(1),
            std::time::Duration::from_secs(1),
        )];

        let layout = layout(vec![a, b], conditions, 5);
        let violations = into_result(validate_layout(&layout)).unwrap_err();

        assert_eq!(violations.len(), 5);
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::MissingInitialState { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::DuplicateStateName { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::DanglingTransition { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::UnknownCondition { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::UnmonitoredState { .. })));
    }

    #[test]
    fn misplaced_state_is_reported() {
        let layout = layout(vec![State::new(StateId::new(3), "a")], Vec::new(), 0);
        let violations = into_result(validate_layout(&layout)).unwrap_err();
        assert!(matches!(
            violations[0],
            LayoutViolation::MisplacedState { slot: 0, .. }
        ));
    }

    #[test]
    fn condition_reading_missing_state_is_reported() {
        let conditions = vec![Condition::state_value(StateId::new(9), true)];
        let layout = layout(vec![State::new(StateId::new(0), "a")], conditions, 0);
        let violations = into_result(validate_layout(&layout)).unwrap_err();
        assert_eq!(
            violations,
            vec![LayoutViolation::UnboundCondition {
                condition: ConditionId::new(0),
                state: StateId::new(9),
            }]
        );
    }
}
