//! Tickwise: a polled finite state machine engine
//!
//! States, transitions and conditions live in an arena-backed [`Layout`];
//! a [`FiniteStateMachine`] owns the layout and moves a single current-state
//! pointer through it, one `track` call at a time. Time-based conditions
//! sample a [`Clock`](core::Clock), so granularity is exactly the caller's
//! poll interval.
//!
//! # Core Concepts
//!
//! - **Conditions**: timed, dwell-time, entry-count, value and keycode predicates
//! - **States**: capability-based nodes with optional actions and monitoring
//! - **Links**: builder calls wiring a condition and its transition in one go
//! - **Blinkers**: ready-made blink-pattern machines built on the engine
//!
//! # Example
//!
//! ```rust
//! use tickwise::builder::{LayoutBuilder, StateOptions};
//! use tickwise::core::ManualClock;
//! use tickwise::engine::{FiniteStateMachine, StopReason};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut builder = LayoutBuilder::new(clock.shared());
//! let warmup = builder.add_state(StateOptions::new("warmup").monitored()).unwrap();
//! let ready = builder.add_state(StateOptions::new("ready").terminal()).unwrap();
//! builder.timed_link(warmup, ready, Duration::from_millis(300)).unwrap();
//! builder.initial(warmup).unwrap();
//!
//! let config = tickwise::engine::EngineConfig::default()
//!     .poll_interval(Duration::from_millis(100));
//! let mut machine = FiniteStateMachine::with_config(builder.build().unwrap(), config).unwrap();
//! let outcome = machine.run(true, None).unwrap();
//!
//! assert_eq!(outcome.reason, StopReason::TerminalReached);
//! assert_eq!(machine.history().get_path(), vec!["warmup", "ready"]);
//! ```

pub mod blinker;
pub mod builder;
pub mod core;
pub mod engine;
pub mod validation;

// Re-export commonly used types
pub use blinker::{Blinker, Side, SideBlinkers};
pub use builder::{BuildError, LayoutBuilder, StateOptions};
pub use crate::core::{Condition, ManualClock, MonotonicClock, StateId};
pub use engine::{EngineError, FiniteStateMachine, Layout};
