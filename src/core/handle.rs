//! Stable handles into a layout's state and condition arenas.
//!
//! Transitions store handles instead of references, so cyclic graphs (blink
//! loops) need no shared ownership.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a state inside a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(usize);

impl StateId {
    /// Wrap a raw arena index. Handles are normally obtained from
    /// `LayoutBuilder::add_state`; a raw index is only checked when the
    /// layout is validated.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// Handle of a condition inside a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionId(usize);

impl ConditionId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition#{}", self.0)
    }
}

/// Handle of a transition: its source state plus its registration slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionId {
    pub source: StateId,
    pub slot: usize,
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/transition#{}", self.source, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_display_their_index() {
        assert_eq!(StateId::new(3).to_string(), "state#3");
        assert_eq!(ConditionId::new(7).to_string(), "condition#7");

        let transition = TransitionId {
            source: StateId::new(1),
            slot: 2,
        };
        assert_eq!(transition.to_string(), "state#1/transition#2");
    }

    #[test]
    fn handles_are_ordered_by_index() {
        assert!(StateId::new(1) < StateId::new(2));
        assert_eq!(StateId::new(4).index(), 4);
    }
}
