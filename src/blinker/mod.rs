//! Blink patterns built on the engine.
//!
//! A [`Blinker`] is a fixed eleven-state layout driven through commands
//! (`turn_on1`, `blink2`, ...) and stepped with `track`. [`SideBlinkers`]
//! pairs two of them and mirrors every command onto a [`Side`].

#[allow(clippy::module_inception)]
mod blinker;
mod side;

pub use blinker::{BlinkOutput, Blinker, BlinkerError, BlinkerState};
pub use side::{Side, SideBlinkers};
