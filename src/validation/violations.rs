//! Structural problems a layout can have.

use crate::core::{ConditionId, StateId};
use thiserror::Error;

/// A single reason a layout cannot be run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutViolation {
    #[error("Initial state {initial} is not part of the layout ({state_count} states)")]
    MissingInitialState { initial: StateId, state_count: usize },

    #[error("State '{state}' is stored at slot {slot} but carries handle {id}")]
    MisplacedState {
        state: String,
        slot: usize,
        id: StateId,
    },

    #[error("State name '{state}' is used more than once")]
    DuplicateStateName { state: String },

    #[error("Transition {slot} of state '{state}' targets {target}, which is not in the layout")]
    DanglingTransition {
        state: String,
        slot: usize,
        target: StateId,
    },

    #[error("Transition {slot} of state '{state}' is guarded by unknown {condition}")]
    UnknownCondition {
        state: String,
        slot: usize,
        condition: ConditionId,
    },

    #[error("{condition} reads {state}, which is not in the layout")]
    UnboundCondition {
        condition: ConditionId,
        state: StateId,
    },

    #[error("{condition} reads state '{state}', which is not monitored")]
    UnmonitoredState {
        condition: ConditionId,
        state: String,
    },
}

/// Render a list of violations on one line.
pub(crate) fn describe(violations: &[LayoutViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
