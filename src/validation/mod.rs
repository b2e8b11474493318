//! Validation of layouts before a machine may run them.
//!
//! Uses Stillwater's `Validation` type so one pass reports every violation
//! instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use tickwise::core::{ManualClock, State, StateId, Transition};
//! use tickwise::engine::Layout;
//! use stillwater::validation::Validation;
//!
//! let mut idle = State::new(StateId::new(0), "idle");
//! idle.push_transition(Transition::always(StateId::new(4)));
//!
//! let layout = Layout::from_parts(vec![idle], Vec::new(), StateId::new(2), ManualClock::new().shared());
//!
//! match layout.validate() {
//!     Validation::Failure(errors) => assert_eq!(errors.len(), 2),
//!     Validation::Success(_) => panic!("layout should be invalid"),
//! }
//! ```

pub mod rules;
pub mod violations;

pub use rules::validate_layout;
pub use violations::LayoutViolation;
