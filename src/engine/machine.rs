//! Polled finite state machine engine.

use crate::core::{
    Condition, ConditionId, State, StateHistory, StateId, StateTransition, TransitionId, Value,
};
use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::layout::Layout;
use crate::validation::rules::into_result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Execution status of the engine, distinct from the applicative state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalState {
    /// No current state yet; the next `track` enters the initial state.
    Uninitialized,
    /// Has a current state, not stepping.
    Idle,
    /// Stepping through `track`.
    Running,
    /// A terminal state was entered; `track` now returns false.
    TerminalReached,
}

/// Why `run` stopped polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    TerminalReached,
    BudgetExhausted,
}

/// Summary of a `run` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Number of `track` calls made.
    pub ticks: u64,
    pub reason: StopReason,
}

/// Engine stepping a single current state through a [`Layout`].
///
/// The machine never owns states beyond the layout it was given; it only
/// moves the pointer to the current one and lets states update their own
/// counters on entry and exit.
///
/// # Example
///
/// ```rust
/// use tickwise::builder::{LayoutBuilder, StateOptions};
/// use tickwise::core::ManualClock;
/// use tickwise::engine::FiniteStateMachine;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut builder = LayoutBuilder::new(clock.shared());
/// let red = builder.add_state(StateOptions::new("red").monitored()).unwrap();
/// let green = builder.add_state(StateOptions::new("green").monitored()).unwrap();
/// builder.timed_link(red, green, Duration::from_secs(30)).unwrap();
/// builder.timed_link(green, red, Duration::from_secs(20)).unwrap();
/// builder.initial(red).unwrap();
///
/// let mut machine = FiniteStateMachine::new(builder.build().unwrap()).unwrap();
/// machine.track().unwrap();
/// assert_eq!(machine.current_state_name(), "red");
///
/// clock.advance(Duration::from_secs(30));
/// machine.track().unwrap();
/// assert_eq!(machine.current_state_name(), "green");
/// ```
#[derive(Debug)]
pub struct FiniteStateMachine {
    layout: Layout,
    current: StateId,
    operational: OperationalState,
    terminal_exit_done: bool,
    config: EngineConfig,
    history: StateHistory,
}

impl FiniteStateMachine {
    /// Create a machine with default configuration.
    pub fn new(layout: Layout) -> Result<Self, EngineError> {
        Self::with_config(layout, EngineConfig::default())
    }

    /// Create a machine, refusing an invalid layout.
    pub fn with_config(layout: Layout, config: EngineConfig) -> Result<Self, EngineError> {
        into_result(layout.validate()).map_err(EngineError::InvalidLayout)?;
        Ok(Self {
            current: layout.initial(),
            layout,
            operational: OperationalState::Uninitialized,
            terminal_exit_done: false,
            history: StateHistory::with_capacity(config.history_capacity),
            config,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn operational_state(&self) -> OperationalState {
        self.operational
    }

    /// Current applicative state. Before the first step this is the
    /// initial state, which has not been entered yet.
    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn current_state_name(&self) -> &str {
        self.layout.state(self.current).map_or("", State::name)
    }

    pub fn is_terminal(&self) -> bool {
        self.operational == OperationalState::TerminalReached
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.layout.state(id)
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.layout.state_id(name)
    }

    /// Reading of the layout's clock.
    pub fn now(&self) -> Duration {
        self.layout.clock().now()
    }

    /// Mutable access to a condition, for retuning durations or expected
    /// values after the graph was built.
    pub fn condition_mut(&mut self, id: ConditionId) -> Result<&mut Condition, EngineError> {
        self.layout
            .condition_mut(id)
            .ok_or(EngineError::UnknownCondition(id))
    }

    /// Re-stamp a timed condition's reference instant to now.
    /// Returns false when the condition is not a timed one.
    pub fn reset_condition(&mut self, id: ConditionId) -> Result<bool, EngineError> {
        let now = self.now();
        Ok(self.condition_mut(id)?.reset(now))
    }

    /// Set the free-form value read by state-value conditions.
    pub fn set_custom_value(
        &mut self,
        state: StateId,
        value: impl Into<Value>,
    ) -> Result<(), EngineError> {
        self.layout
            .state_mut(state)
            .ok_or(EngineError::UnknownState(state))?
            .set_custom_value(value);
        Ok(())
    }

    /// Enter the initial state and become idle.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.current = self.layout.initial();
        self.terminal_exit_done = false;
        let now = self.now();
        let state = self.state_mut(self.current)?;
        state.execute_entering_action(now)?;
        let terminal = state.is_terminal();
        info!(state = %self.current_state_name(), "machine started");

        self.operational = if terminal {
            OperationalState::TerminalReached
        } else {
            OperationalState::Idle
        };
        Ok(())
    }

    /// Forget the current state. The next `track` re-enters the initial state.
    pub fn reset(&mut self) {
        debug!(state = %self.current_state_name(), "machine reset");
        self.current = self.layout.initial();
        self.operational = OperationalState::Uninitialized;
        self.terminal_exit_done = false;
    }

    /// Advance the machine by one step.
    ///
    /// 1. An uninitialized machine enters its initial state and stops there.
    /// 2. A machine that reached a terminal state runs that state's exiting
    ///    action once and returns `false` from then on.
    /// 3. Otherwise the first enabled transition of the current state (in
    ///    registration order) is taken: exit, transition side effects, entry.
    ///    The current state's in-state action then runs either way.
    ///
    /// Returns `false` once a terminal state has been reached and left.
    pub fn track(&mut self) -> Result<bool, EngineError> {
        match self.operational {
            OperationalState::Uninitialized => {
                self.start()?;
                return Ok(true);
            }
            OperationalState::TerminalReached => {
                if !self.terminal_exit_done {
                    let now = self.now();
                    self.state_mut(self.current)?.execute_exiting_action(now)?;
                    self.terminal_exit_done = true;
                    info!(state = %self.current_state_name(), "terminal state reached");
                }
                return Ok(false);
            }
            OperationalState::Idle | OperationalState::Running => {
                if self.terminal_finished() {
                    return Ok(false);
                }
            }
        }

        self.operational = OperationalState::Running;
        let now = self.now();
        trace!(state = %self.current_state_name(), ?now, "tick");

        if let Some(slot) = self.layout.first_enabled(self.current, now) {
            self.execute_transition(slot, now)?;
        }

        let now = self.now();
        self.state_mut(self.current)?.execute_in_state_action(now)?;
        Ok(true)
    }

    /// Poll `track` until it returns false or `time_budget` has elapsed.
    ///
    /// The budget is checked once per step, so an in-progress transition
    /// always completes. The machine is left idle and can be run again.
    pub fn run(
        &mut self,
        reset: bool,
        time_budget: Option<Duration>,
    ) -> Result<RunOutcome, EngineError> {
        if reset {
            self.reset();
        }
        let budget = time_budget.or(self.config.default_time_budget);
        let poll_interval = self.config.poll_interval;
        let clock = Arc::clone(self.layout.clock());
        let started = clock.now();
        let mut ticks = 0;

        let reason = loop {
            let keep_going = self.track()?;
            ticks += 1;
            if !keep_going {
                break StopReason::TerminalReached;
            }
            if let Some(budget) = budget {
                if clock.now().saturating_sub(started) >= budget {
                    debug!(ticks, ?budget, "run budget exhausted");
                    break StopReason::BudgetExhausted;
                }
            }
            if let Some(interval) = poll_interval {
                clock.sleep(interval);
            }
        };

        self.operational = OperationalState::Idle;
        Ok(RunOutcome { ticks, reason })
    }

    /// Jump straight to `target`, bypassing transitions and conditions.
    ///
    /// Runs the current state's exiting action, moves the pointer and runs
    /// the target's entering action.
    pub fn transit_to(&mut self, target: StateId) -> Result<(), EngineError> {
        if self.operational == OperationalState::Uninitialized {
            return Err(EngineError::NotStarted);
        }
        if self.layout.state(target).is_none() {
            return Err(EngineError::UnknownState(target));
        }

        let from = self.current;
        let now = self.now();
        if !self.terminal_finished() {
            self.state_mut(from)?.execute_exiting_action(now)?;
        }
        if self.operational == OperationalState::TerminalReached {
            self.operational = OperationalState::Idle;
        }
        self.enter(from, target, now, true)
    }

    /// The current state is terminal and its exit already ran.
    fn terminal_finished(&self) -> bool {
        self.terminal_exit_done
            && self
                .layout
                .state(self.current)
                .is_some_and(State::is_terminal)
    }

    fn execute_transition(&mut self, slot: usize, now: Duration) -> Result<(), EngineError> {
        let from = self.current;
        let target = self
            .layout
            .transition_target(TransitionId { source: from, slot })
            .ok_or(EngineError::UnknownState(from))?;
        if self.layout.state(target).is_none() {
            return Err(EngineError::UnknownState(target));
        }

        let source = self.state_mut(from)?;
        source.execute_exiting_action(now)?;
        if let Some(transition) = source.transition_mut(slot) {
            transition.execute_transiting_action(from, now)?;
        }
        self.enter(from, target, now, false)
    }

    fn enter(
        &mut self,
        from: StateId,
        target: StateId,
        now: Duration,
        forced: bool,
    ) -> Result<(), EngineError> {
        self.current = target;
        let state = self.state_mut(target)?;
        state.execute_entering_action(now)?;
        let terminal = state.is_terminal();
        self.record(from, target, now, forced);

        self.terminal_exit_done = false;
        if terminal {
            self.operational = OperationalState::TerminalReached;
        }
        Ok(())
    }

    fn record(&mut self, from: StateId, to: StateId, now: Duration, forced: bool) {
        let name = |id: StateId| {
            self.layout
                .state(id)
                .map_or_else(|| id.to_string(), |state| state.name().to_string())
        };
        let transition = StateTransition {
            from: name(from),
            to: name(to),
            at: now,
            timestamp: Utc::now(),
            forced,
        };
        debug!(from = %transition.from, to = %transition.to, forced, "transition");
        self.history.record(transition);
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut State, EngineError> {
        self.layout
            .state_mut(id)
            .ok_or(EngineError::UnknownState(id))
    }
}
