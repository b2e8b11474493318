//! Callbacks attached to state lifecycle hooks and transitions.

use super::handle::StateId;
use std::time::Duration;
use thiserror::Error;

/// Error returned by a user callback.
///
/// The engine never catches or retries it: the error aborts the current
/// `track`/`run` call and reaches the caller unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Action failed: {message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of a callback.
pub type ActionResult = Result<(), ActionError>;

/// What a state hook sees when it runs.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub state: StateId,
    pub state_name: &'a str,
    pub now: Duration,
    /// Entry count of a monitored state, already updated for this entry.
    pub entry_count: Option<u64>,
}

/// What a transiting callback sees when it runs.
#[derive(Debug, Clone, Copy)]
pub struct TransitContext {
    pub from: StateId,
    pub to: StateId,
    pub now: Duration,
    /// Transit count of a monitored transition, already updated for this transit.
    pub transit_count: Option<u64>,
}

/// Callback run on enter, in-state or exit.
pub type Action = Box<dyn FnMut(&ActionContext<'_>) -> ActionResult + Send>;

/// Callback run while a transition is being taken.
pub type TransitAction = Box<dyn FnMut(&TransitContext) -> ActionResult + Send>;

/// Run every callback in registration order, stopping at the first failure.
pub(crate) fn run_actions(actions: &mut [Action], ctx: &ActionContext<'_>) -> ActionResult {
    for action in actions.iter_mut() {
        action(ctx)?;
    }
    Ok(())
}

pub(crate) fn run_transit_actions(
    actions: &mut [TransitAction],
    ctx: &TransitContext,
) -> ActionResult {
    for action in actions.iter_mut() {
        action(ctx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn ctx() -> ActionContext<'static> {
        ActionContext {
            state: StateId::new(0),
            state_name: "idle",
            now: Duration::ZERO,
            entry_count: None,
        }
    }

    #[test]
    fn actions_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut actions: Vec<Action> = (0..3)
            .map(|i| {
                let log = Arc::clone(&log);
                Box::new(move |_: &ActionContext<'_>| {
                    log.lock().unwrap().push(i);
                    Ok(())
                }) as Action
            })
            .collect();

        run_actions(&mut actions, &ctx()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn failing_action_surfaces_its_error() {
        let mut actions: Vec<Action> = vec![Box::new(|_: &ActionContext<'_>| {
            Err(ActionError::new("motor stalled"))
        })];

        let err = run_actions(&mut actions, &ctx()).unwrap_err();
        assert_eq!(err.message(), "motor stalled");
        assert_eq!(err.to_string(), "Action failed: motor stalled");
    }
}
