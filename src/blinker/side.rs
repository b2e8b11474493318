//! Two blinkers driven as a pair.

use super::blinker::{BlinkOutput, Blinker, BlinkerError, Command};
use crate::core::SharedClock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which blinker a [`SideBlinkers`] command addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Both,
    /// Left gets the command, right the opposite phase.
    LeftReciprocal,
    /// Right gets the command, left the opposite phase.
    RightReciprocal,
}

/// Left and right blinkers with side-aware commands.
///
/// The two blinkers keep independent timing; a reciprocal command only
/// starts them in opposite phases.
///
/// # Example
///
/// ```rust
/// use tickwise::blinker::{Side, SideBlinkers};
/// use tickwise::core::ManualClock;
///
/// let clock = ManualClock::new();
/// let mut blinkers = SideBlinkers::new(clock.shared()).unwrap();
/// blinkers.turn_on1(Side::LeftReciprocal).unwrap();
/// assert!(blinkers.left().is_on());
/// assert!(!blinkers.right().is_on());
/// ```
#[derive(Debug)]
pub struct SideBlinkers {
    left: Blinker,
    right: Blinker,
}

impl SideBlinkers {
    pub fn new(clock: SharedClock) -> Result<Self, BlinkerError> {
        Ok(Self {
            left: Blinker::new(clock.clone())?,
            right: Blinker::new(clock)?,
        })
    }

    pub fn with_outputs(
        clock: SharedClock,
        left: impl BlinkOutput + 'static,
        right: impl BlinkOutput + 'static,
    ) -> Result<Self, BlinkerError> {
        Ok(Self {
            left: Blinker::with_output(clock.clone(), left)?,
            right: Blinker::with_output(clock, right)?,
        })
    }

    pub fn left(&self) -> &Blinker {
        &self.left
    }

    pub fn right(&self) -> &Blinker {
        &self.right
    }

    /// Step both blinkers.
    pub fn track(&mut self) -> Result<(), BlinkerError> {
        self.left.track()?;
        self.right.track()
    }

    pub fn turn_on1(&mut self, side: Side) -> Result<(), BlinkerError> {
        self.dispatch(side, Command::On)
    }

    pub fn turn_off1(&mut self, side: Side) -> Result<(), BlinkerError> {
        self.dispatch(side, Command::Off)
    }

    pub fn turn_on2(&mut self, side: Side, duration: Duration) -> Result<(), BlinkerError> {
        self.dispatch(side, Command::OnFor(duration))
    }

    pub fn turn_off2(&mut self, side: Side, duration: Duration) -> Result<(), BlinkerError> {
        self.dispatch(side, Command::OffFor(duration))
    }

    pub fn blink1(
        &mut self,
        side: Side,
        cycle_duration: Duration,
        percent_on: f64,
        begin_on: bool,
    ) -> Result<(), BlinkerError> {
        let command = Command::Blink {
            cycle: cycle_duration,
            percent_on,
            begin_on,
        };
        self.dispatch(side, command)
    }

    pub fn blink2(
        &mut self,
        side: Side,
        total_duration: Duration,
        cycle_duration: Duration,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<(), BlinkerError> {
        let command = Command::BoundedBlink {
            total: total_duration,
            cycle: cycle_duration,
            percent_on,
            begin_on,
            end_off,
        };
        self.dispatch(side, command)
    }

    pub fn blink3(
        &mut self,
        side: Side,
        total_duration: Duration,
        n_cycle: u32,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<(), BlinkerError> {
        let command =
            Command::bounded_by_count(total_duration, n_cycle, percent_on, begin_on, end_off)?;
        self.dispatch(side, command)
    }

    pub fn blink4(
        &mut self,
        side: Side,
        n_cycle: u32,
        cycle_duration: Duration,
        percent_on: f64,
        begin_on: bool,
        end_off: bool,
    ) -> Result<(), BlinkerError> {
        let command =
            Command::bounded_by_cycle(n_cycle, cycle_duration, percent_on, begin_on, end_off)?;
        self.dispatch(side, command)
    }

    fn dispatch(&mut self, side: Side, command: Command) -> Result<(), BlinkerError> {
        // Reject before touching either side.
        command.validate()?;
        match side {
            Side::Left => self.left.apply(command),
            Side::Right => self.right.apply(command),
            Side::Both => {
                self.left.apply(command)?;
                self.right.apply(command)
            }
            Side::LeftReciprocal => {
                self.left.apply(command)?;
                self.right.apply(command.inverted())
            }
            Side::RightReciprocal => {
                self.right.apply(command)?;
                self.left.apply(command.inverted())
            }
        }
    }
}
