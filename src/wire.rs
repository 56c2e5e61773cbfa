//! Button identities and their wire encoding.
//!
//! The protocol is one direction only: every pin transition becomes exactly
//! one byte on the stream, and that byte is the button number itself.
//! There is no framing, length prefix or acknowledgement.

use std::fmt;
use thiserror::Error;

/// One of the three monitored buttons.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ButtonId {
    One = 1,
    Two = 2,
    Three = 3,
}

/// Returned when a byte does not name a known button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid button number {0} (expected 1, 2 or 3)")]
pub struct InvalidButton(pub u8);

impl ButtonId {
    /// All buttons, in wiring order.
    pub const ALL: [ButtonId; 3] = [ButtonId::One, ButtonId::Two, ButtonId::Three];

    /// The byte written to the wire for this button.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ButtonId {
    type Error = InvalidButton;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(ButtonId::One),
            2 => Ok(ButtonId::Two),
            3 => Ok(ButtonId::Three),
            other => Err(InvalidButton(other)),
        }
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte())
    }
}
