//! Core graph types: conditions, transitions, states and their capabilities.
//!
//! This module contains the building blocks the engine steps over:
//! - Conditions guarding transitions (timed, value, count and keycode based)
//! - Transitions referencing their destination through a [`StateId`]
//! - States with optional action and monitoring components
//! - A clock abstraction and bounded transition history
//!
//! Nothing in this module advances a machine; that is the engine's job.

mod action;
mod clock;
mod condition;
mod handle;
mod history;
mod keycode;
mod state;
mod transition;
mod value;

pub use action::{Action, ActionContext, ActionError, ActionResult, TransitAction, TransitContext};
pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use condition::{Condition, ConditionKind, EvalContext};
pub use handle::{ConditionId, StateId, TransitionId};
pub use history::{StateHistory, StateTransition};
pub use keycode::{Debounce, Keycode, KeycodeSource, UnknownKeycode};
pub use state::{ActionBundle, HasTransitions, Monitor, State};
pub use transition::{Guard, TransitMonitor, Transition};
pub use value::{SharedValue, Value};
