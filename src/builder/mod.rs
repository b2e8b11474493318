//! Builder API for assembling layouts.
//!
//! [`LayoutBuilder`] hands out typed handles for states, conditions and
//! transitions and checks every handle as it is used, so a built
//! [`Layout`](crate::engine::Layout) never contains a dangling reference.
//! The link builders install a condition together with the transition it
//! guards.

pub mod error;
pub mod layout;
pub mod links;
pub mod macros;

pub use error::BuildError;
pub use layout::{LayoutBuilder, StateOptions};
pub use links::Link;
