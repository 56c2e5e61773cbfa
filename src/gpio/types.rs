//! Pin configuration, events and error definitions.

use std::fmt;
use thiserror::Error;

/// A physical input line, addressed by controller and pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinLine {
    pub controller: u32,
    pub pin: u32,
}

impl PinLine {
    pub fn new(controller: u32, pin: u32) -> Self {
        Self { controller, pin }
    }
}

impl fmt::Display for PinLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.controller, self.pin)
    }
}

/// Pin direction. Buttons are only ever read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    InputOnly,
}

/// Idle bias applied to an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    PullDown,
    PullUp,
    Floating,
}

/// Which transitions raise a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    BothEdges,
    RisingEdge,
    FallingEdge,
}

impl Trigger {
    /// Whether a transition from `old` to `new` fires this trigger.
    pub fn fires(self, old: bool, new: bool) -> bool {
        match self {
            Trigger::BothEdges => old != new,
            Trigger::RisingEdge => !old && new,
            Trigger::FallingEdge => old && !new,
        }
    }
}

/// Everything needed to open one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    pub line: PinLine,
    pub direction: Direction,
    pub drive_mode: DriveMode,
    pub trigger: Trigger,
    pub initial_value: bool,
}

impl PinConfig {
    /// Fixed button configuration: input only, pulled down, both edges, low.
    pub fn button(line: PinLine) -> Self {
        Self {
            line,
            direction: Direction::InputOnly,
            drive_mode: DriveMode::PullDown,
            trigger: Trigger::BothEdges,
            initial_value: false,
        }
    }
}

/// Edge notification delivered to a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    /// Logical level after the transition.
    pub value: bool,
}

/// Errors raised by a GPIO provider or an open pin.
#[derive(Debug, Error)]
pub enum GpioError {
    /// The line is already held by another handle.
    #[error("GPIO line {0} is busy")]
    Busy(PinLine),

    /// The provider cannot open the line.
    #[error("GPIO line {line} unavailable: {reason}")]
    Unavailable { line: PinLine, reason: String },

    /// The handle was already closed.
    #[error("GPIO line {0} already closed")]
    Closed(PinLine),

    /// Driver-level I/O failure.
    #[error("GPIO I/O error on line {line}: {source}")]
    Io {
        line: PinLine,
        #[source]
        source: std::io::Error,
    },
}
