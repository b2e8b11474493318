//! Build errors for layouts and their links.

use crate::core::{ConditionId, StateId, TransitionId, UnknownKeycode};
use crate::validation::violations::{describe, LayoutViolation};
use thiserror::Error;

/// Errors that can occur while assembling a layout.
///
/// Every malformed input is rejected at the call that introduces it, never
/// deferred to the first `track`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Unknown state {0}")]
    UnknownState(StateId),

    #[error("Unknown condition {0}")]
    UnknownCondition(ConditionId),

    #[error("Unknown transition {0}")]
    UnknownTransition(TransitionId),

    #[error("State name '{0}' is already used")]
    DuplicateState(String),

    #[error("State '{state}' has no actions. Create it with StateOptions::with_actions()")]
    MissingActions { state: String },

    #[error("State '{state}' is not monitored. Create it with StateOptions::monitored()")]
    NotMonitored { state: String },

    #[error(transparent)]
    Keycode(#[from] UnknownKeycode),

    #[error("Layout is invalid: {}", describe(.0))]
    InvalidLayout(Vec<LayoutViolation>),
}
