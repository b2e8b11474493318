//! Engine errors.

use crate::core::{ActionError, ConditionId, StateId};
use crate::validation::violations::{describe, LayoutViolation};
use thiserror::Error;

/// Errors raised while constructing or stepping a machine.
///
/// Apart from [`EngineError::Action`], these are invariant violations: the
/// engine does not try to recover from them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Layout is invalid: {}", describe(.0))]
    InvalidLayout(Vec<LayoutViolation>),

    #[error("Machine has no current state yet. Call .start() or .track() first")]
    NotStarted,

    #[error("Unknown state {0}")]
    UnknownState(StateId),

    #[error("Unknown condition {0}")]
    UnknownCondition(ConditionId),

    #[error(transparent)]
    Action(#[from] ActionError),
}
