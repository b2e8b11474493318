//! Remote-control keys and the accessor that polls them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key on the infrared remote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keycode {
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Up,
    Down,
    Left,
    Right,
    Ok,
    Star,
    Hash,
}

impl Keycode {
    pub const ALL: [Keycode; 17] = [
        Keycode::Digit0,
        Keycode::Digit1,
        Keycode::Digit2,
        Keycode::Digit3,
        Keycode::Digit4,
        Keycode::Digit5,
        Keycode::Digit6,
        Keycode::Digit7,
        Keycode::Digit8,
        Keycode::Digit9,
        Keycode::Up,
        Keycode::Down,
        Keycode::Left,
        Keycode::Right,
        Keycode::Ok,
        Keycode::Star,
        Keycode::Hash,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Digit0 => "0",
            Self::Digit1 => "1",
            Self::Digit2 => "2",
            Self::Digit3 => "3",
            Self::Digit4 => "4",
            Self::Digit5 => "5",
            Self::Digit6 => "6",
            Self::Digit7 => "7",
            Self::Digit8 => "8",
            Self::Digit9 => "9",
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Ok => "ok",
            Self::Star => "*",
            Self::Hash => "#",
        }
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown keycode '{0}'")]
pub struct UnknownKeycode(pub String);

impl FromStr for Keycode {
    type Err = UnknownKeycode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name() == lowered)
            .ok_or_else(|| UnknownKeycode(s.to_string()))
    }
}

/// Accessor returning the key currently held on the remote, if any.
pub trait KeycodeSource: Send {
    fn current_code(&mut self) -> Option<Keycode>;
}

impl<F> KeycodeSource for F
where
    F: FnMut() -> Option<Keycode> + Send,
{
    fn current_code(&mut self) -> Option<Keycode> {
        self()
    }
}

/// Per-instance debounce turning a held key into a single edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debounce {
    consumed: bool,
}

impl Debounce {
    /// True on the first reading that equals `expected`; false while the key
    /// stays held; re-armed once any other reading is seen.
    pub(crate) fn edge(&mut self, reading: Option<Keycode>, expected: Keycode) -> bool {
        if reading == Some(expected) {
            let fire = !self.consumed;
            self.consumed = true;
            fire
        } else {
            self.consumed = false;
            false
        }
    }
}
