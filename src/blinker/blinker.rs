//! Blink-pattern generator built on the engine.

use crate::builder::{BuildError, LayoutBuilder, StateOptions};
use crate::core::{ActionContext, ActionResult, ConditionId, SharedClock, StateId};
use crate::engine::{EngineError, FiniteStateMachine, Layout};
use crate::state_enum;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

state_enum! {
    /// Internal states of a [`Blinker`].
    pub enum BlinkerState {
        Off => "off",
        On => "on",
        OffForDuration => "off_for_duration",
        OnForDuration => "on_for_duration",
        BlinkOn => "blink_on",
        BlinkOff => "blink_off",
        BlinkBegin => "blink_begin",
        BlinkStopBegin => "blink_stop_begin",
        BlinkStopOn => "blink_stop_on",
        BlinkStopOff => "blink_stop_off",
        BlinkStopEnd => "blink_stop_end",
    }
}

impl BlinkerState {
    /// Light level this state drives, `None` for the transient branch states.
    pub fn lit(self) -> Option<bool> {
        match self {
            Self::On | Self::OnForDuration | Self::BlinkOn | Self::BlinkStopOn => Some(true),
            Self::Off | Self::OffForDuration | Self::BlinkOff | Self::BlinkStopOff => Some(false),
            Self::BlinkBegin | Self::BlinkStopBegin | Self::BlinkStopEnd => None,
        }
    }

    // States are registered in declaration order.
    fn id(self) -> StateId {
        StateId::new(self as usize)
    }
}

/// Sink for the light level, typically an LED driver.
pub trait BlinkOutput: Send {
    fn set_on(&mut self, on: bool) -> ActionResult;
}

impl<F> BlinkOutput for F
where
    F: FnMut(bool) -> ActionResult + Send,
{
    fn set_on(&mut self, on: bool) -> ActionResult {
        self(on)
    }
}

type SharedOutput = Arc<Mutex<Box<dyn BlinkOutput>>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlinkerError {
    #[error("Invalid blink parameter {parameter}: {value}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
    },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl BlinkerError {
    fn invalid(parameter: &'static str, value: impl std::fmt::Debug) -> Self {
        Self::InvalidParameter {
            parameter,
            value: format!("{value:?}"),
        }
    }
}

/// One blinker command, as accepted by [`Blinker`] and mirrored by
/// [`SideBlinkers`](super::SideBlinkers).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Command {
    On,
    Off,
    OnFor(Duration),
    OffFor(Duration),
    Blink {
        cycle: Duration,
        percent_on: f64,
        begin_on: bool,
    },
    BoundedBlink {
        total: Duration,
        cycle: Duration,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    },
}

impl Command {
    pub(crate) fn bounded_by_count(
        total: Duration,
        n_cycle: u32,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<Self, BlinkerError> {
        if n_cycle == 0 {
            return Err(BlinkerError::invalid("n_cycle", n_cycle));
        }
        Ok(Self::BoundedBlink {
            total,
            cycle: total / n_cycle,
            percent_on,
            begin_on,
            end_off,
        })
    }

    pub(crate) fn bounded_by_cycle(
        n_cycle: u32,
        cycle: Duration,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<Self, BlinkerError> {
        if n_cycle == 0 {
            return Err(BlinkerError::invalid("n_cycle", n_cycle));
        }
        let total = cycle
            .checked_mul(n_cycle)
            .ok_or_else(|| BlinkerError::invalid("cycle_duration", cycle))?;
        Ok(Self::BoundedBlink {
            total,
            cycle,
            percent_on,
            begin_on,
            end_off,
        })
    }

    pub(crate) fn validate(&self) -> Result<(), BlinkerError> {
        match *self {
            Self::Blink {
                cycle, percent_on, ..
            }
            | Self::BoundedBlink {
                cycle, percent_on, ..
            } => {
                if cycle.is_zero() {
                    return Err(BlinkerError::invalid("cycle_duration", cycle));
                }
                if !(0.0..=1.0).contains(&percent_on) {
                    return Err(BlinkerError::invalid("percent_on", percent_on));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Same command with the opposite phase.
    pub(crate) fn inverted(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
            Self::OnFor(duration) => Self::OffFor(duration),
            Self::OffFor(duration) => Self::OnFor(duration),
            Self::Blink {
                cycle,
                percent_on,
                begin_on,
            } => Self::Blink {
                cycle,
                percent_on: 1.0 - percent_on,
                begin_on: !begin_on,
            },
            Self::BoundedBlink {
                total,
                cycle,
                percent_on,
                begin_on,
                end_off,
            } => Self::BoundedBlink {
                total,
                cycle,
                percent_on: 1.0 - percent_on,
                begin_on: !begin_on,
                end_off: !end_off,
            },
        }
    }
}

/// Split a cycle into its on and off phases.
fn duty(cycle: Duration, percent_on: f64) -> (Duration, Duration) {
    let on = cycle.mul_f64(percent_on).min(cycle);
    (on, cycle - on)
}

/// Conditions retuned by commands.
#[derive(Clone, Copy, Debug)]
struct Tuning {
    on_for: ConditionId,
    off_for: ConditionId,
    blink_on: ConditionId,
    blink_off: ConditionId,
    stop_on_phase: ConditionId,
    stop_off_phase: ConditionId,
    stop_on_total: ConditionId,
    stop_off_total: ConditionId,
}

/// A light that can be switched, pulsed or blinked.
///
/// Steady on and off are sink states; every timed behavior ends in one of
/// them. Call [`Blinker::track`] periodically to let timed behaviors
/// advance; commands themselves take effect immediately.
///
/// # Example
///
/// ```rust
/// use tickwise::blinker::{Blinker, BlinkerState};
/// use tickwise::core::ManualClock;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut blinker = Blinker::new(clock.shared()).unwrap();
/// blinker.turn_on2(Duration::from_millis(500)).unwrap();
/// assert!(blinker.is_on());
///
/// clock.advance(Duration::from_millis(500));
/// blinker.track().unwrap();
/// assert_eq!(blinker.state(), BlinkerState::Off);
/// ```
#[derive(Debug)]
pub struct Blinker {
    machine: FiniteStateMachine,
    tuning: Tuning,
}

impl Blinker {
    /// Blinker with no output attached; observe it through [`Blinker::is_on`].
    pub fn new(clock: SharedClock) -> Result<Self, BlinkerError> {
        Self::assemble(clock, None)
    }

    /// Blinker that drives `output` on every light change.
    pub fn with_output(
        clock: SharedClock,
        output: impl BlinkOutput + 'static,
    ) -> Result<Self, BlinkerError> {
        let output: SharedOutput = Arc::new(Mutex::new(Box::new(output)));
        Self::assemble(clock, Some(output))
    }

    fn assemble(clock: SharedClock, output: Option<SharedOutput>) -> Result<Self, BlinkerError> {
        let (layout, tuning) = build_layout(clock, output)?;
        let mut machine = FiniteStateMachine::new(layout)?;
        machine.start()?;
        Ok(Self { machine, tuning })
    }

    pub fn state(&self) -> BlinkerState {
        let index = self.machine.current_state().index();
        // Every layout state is a BlinkerState.
        BlinkerState::ALL
            .get(index)
            .copied()
            .unwrap_or(BlinkerState::Off)
    }

    pub fn is_on(&self) -> bool {
        self.state().lit() == Some(true)
    }

    pub fn machine(&self) -> &FiniteStateMachine {
        &self.machine
    }

    /// Let timed behaviors advance by one step.
    pub fn track(&mut self) -> Result<(), BlinkerError> {
        self.machine.track()?;
        Ok(())
    }

    pub fn turn_on1(&mut self) -> Result<(), BlinkerError> {
        self.apply(Command::On)
    }

    pub fn turn_off1(&mut self) -> Result<(), BlinkerError> {
        self.apply(Command::Off)
    }

    /// Light for `duration`, then switch off.
    pub fn turn_on2(&mut self, duration: Duration) -> Result<(), BlinkerError> {
        self.apply(Command::OnFor(duration))
    }

    /// Stay dark for `duration`, then switch on.
    pub fn turn_off2(&mut self, duration: Duration) -> Result<(), BlinkerError> {
        self.apply(Command::OffFor(duration))
    }

    /// Blink forever with `percent_on` of each cycle lit.
    pub fn blink1(
        &mut self,
        cycle_duration: Duration,
        percent_on: f64,
        begin_on: bool,
    ) -> Result<(), BlinkerError> {
        self.apply(Command::Blink {
            cycle: cycle_duration,
            percent_on,
            begin_on,
        })
    }

    /// Blink for `total_duration`, then settle off (`end_off`) or on.
    pub fn blink2(
        &mut self,
        total_duration: Duration,
        cycle_duration: Duration,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<(), BlinkerError> {
        self.apply(Command::BoundedBlink {
            total: total_duration,
            cycle: cycle_duration,
            percent_on,
            begin_on,
            end_off,
        })
    }

    /// Blink `n_cycle` cycles spread over `total_duration`.
    pub fn blink3(
        &mut self,
        total_duration: Duration,
        n_cycle: u32,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<(), BlinkerError> {
        let command =
            Command::bounded_by_count(total_duration, n_cycle, percent_on, begin_on, end_off)?;
        self.apply(command)
    }

    /// Blink `n_cycle` cycles of `cycle_duration` each.
    pub fn blink4(
        &mut self,
        n_cycle: u32,
        cycle_duration: Duration,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<(), BlinkerError> {
        let command =
            Command::bounded_by_cycle(n_cycle, cycle_duration, percent_on, begin_on, end_off)?;
        self.apply(command)
    }

    pub(crate) fn apply(&mut self, command: Command) -> Result<(), BlinkerError> {
        command.validate()?;
        debug!(?command, from = %self.state(), "blinker command");
        match command {
            Command::On => self.jump(BlinkerState::On),
            Command::Off => self.jump(BlinkerState::Off),
            Command::OnFor(duration) => {
                self.retune(self.tuning.on_for, duration)?;
                self.jump(BlinkerState::OnForDuration)
            }
            Command::OffFor(duration) => {
                self.retune(self.tuning.off_for, duration)?;
                self.jump(BlinkerState::OffForDuration)
            }
            Command::Blink {
                cycle,
                percent_on,
                begin_on,
            } => {
                let (on, off) = duty(cycle, percent_on);
                self.retune(self.tuning.blink_on, on)?;
                self.retune(self.tuning.blink_off, off)?;
                self.machine
                    .set_custom_value(BlinkerState::BlinkBegin.id(), begin_on)?;
                self.jump(BlinkerState::BlinkBegin)?;
                self.track()
            }
            Command::BoundedBlink {
                total,
                cycle,
                percent_on,
                begin_on,
                end_off,
            } => {
                let (on, off) = duty(cycle, percent_on);
                self.retune(self.tuning.stop_on_phase, on)?;
                self.retune(self.tuning.stop_off_phase, off)?;
                self.retune(self.tuning.stop_on_total, total)?;
                self.retune(self.tuning.stop_off_total, total)?;
                self.machine
                    .set_custom_value(BlinkerState::BlinkStopBegin.id(), begin_on)?;
                self.machine
                    .set_custom_value(BlinkerState::BlinkStopEnd.id(), end_off)?;
                self.jump(BlinkerState::BlinkStopBegin)?;
                self.track()
            }
        }
    }

    fn jump(&mut self, state: BlinkerState) -> Result<(), BlinkerError> {
        self.machine.transit_to(state.id())?;
        Ok(())
    }

    fn retune(&mut self, condition: ConditionId, duration: Duration) -> Result<(), BlinkerError> {
        self.machine.condition_mut(condition)?.set_duration(duration);
        Ok(())
    }
}

fn build_layout(
    clock: SharedClock,
    output: Option<SharedOutput>,
) -> Result<(Layout, Tuning), BuildError> {
    use BlinkerState::*;

    let mut builder = LayoutBuilder::new(clock);
    for state in BlinkerState::ALL {
        let mut options = StateOptions::new(state.name()).monitored();
        if output.is_some() && state.lit().is_some() {
            options = options.with_actions();
        }
        if state.lit().is_none() {
            options = options.custom_value(true);
        }
        builder.add_state(options)?;
    }

    if let Some(output) = output {
        for state in BlinkerState::ALL {
            let Some(lit) = state.lit() else { continue };
            let output = Arc::clone(&output);
            builder.add_entering_action(state.id(), move |_: &ActionContext<'_>| {
                output
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .set_on(lit)
            })?;
        }
    }

    let zero = Duration::ZERO;
    let on_for = builder
        .timed_link(OnForDuration.id(), Off.id(), zero)?
        .condition;
    let off_for = builder
        .timed_link(OffForDuration.id(), On.id(), zero)?
        .condition;

    builder.value_link(BlinkBegin.id(), BlinkOn.id(), true)?;
    builder.value_link(BlinkBegin.id(), BlinkOff.id(), false)?;
    let blink_on = builder.timed_link(BlinkOn.id(), BlinkOff.id(), zero)?.condition;
    let blink_off = builder.timed_link(BlinkOff.id(), BlinkOn.id(), zero)?.condition;

    builder.value_link(BlinkStopBegin.id(), BlinkStopOn.id(), true)?;
    builder.value_link(BlinkStopBegin.id(), BlinkStopOff.id(), false)?;
    // The shared deadline is checked before the phase toggle.
    let stop_on_total = builder
        .duration_owner_link(BlinkStopOn.id(), BlinkStopEnd.id(), BlinkStopBegin.id(), zero)?
        .condition;
    let stop_on_phase = builder
        .timed_link(BlinkStopOn.id(), BlinkStopOff.id(), zero)?
        .condition;
    let stop_off_total = builder
        .duration_owner_link(BlinkStopOff.id(), BlinkStopEnd.id(), BlinkStopBegin.id(), zero)?
        .condition;
    let stop_off_phase = builder
        .timed_link(BlinkStopOff.id(), BlinkStopOn.id(), zero)?
        .condition;
    builder.value_link(BlinkStopEnd.id(), Off.id(), true)?;
    builder.value_link(BlinkStopEnd.id(), On.id(), false)?;

    builder.initial(Off.id())?;
    let tuning = Tuning {
        on_for,
        off_for,
        blink_on,
        blink_off,
        stop_on_phase,
        stop_off_phase,
        stop_on_total,
        stop_off_total,
    };
    Ok((builder.build()?, tuning))
}
