//! The stepping engine.
//!
//! A [`FiniteStateMachine`] consumes a validated [`Layout`] and advances a
//! single current state:
//! - `track` performs one cooperative step
//! - `run` polls `track` until a terminal state or a time budget stops it
//! - `transit_to` forces a jump, bypassing conditions
//!
//! The engine is single-threaded and never blocks except for the optional
//! poll interval inside `run`.

mod config;
mod error;
mod layout;
mod machine;

pub use config::EngineConfig;
pub use error::EngineError;
pub use layout::Layout;
pub use machine::{FiniteStateMachine, OperationalState, RunOutcome, StopReason};
