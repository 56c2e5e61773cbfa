//! GPIO input subsystem.
//!
//! # Data Flow
//! ```text
//! PinProvider::open(PinConfig)
//!     → Box<dyn InputPin> (one handle per line)
//!     → set_listener(Arc<dyn PinListener>)
//!
//! Hardware edge (driver thread)
//!     → PinListener::value_changed(PinEvent)
//! ```
//!
//! # Design Decisions
//! - Providers and pins are trait objects so the bridge never depends on a
//!   particular driver
//! - Listeners may be called from any thread, so they must be `Send + Sync`
//! - A line can only be held by one handle at a time
//! - `close` reports a second close as an error instead of panicking

pub mod sim;
pub mod types;

use std::sync::Arc;

pub use sim::SimulatedGpio;
pub use types::{Direction, DriveMode, GpioError, PinConfig, PinEvent, PinLine, Trigger};

/// Receives edge notifications for one input line.
pub trait PinListener: Send + Sync {
    fn value_changed(&self, event: PinEvent);
}

/// An open handle to one input line.
pub trait InputPin: Send {
    /// The line this handle holds.
    fn line(&self) -> PinLine;

    /// Install the listener that receives this line's edges.
    fn set_listener(&mut self, listener: Arc<dyn PinListener>) -> Result<(), GpioError>;

    /// Release the line. A second call returns [`GpioError::Closed`].
    fn close(&mut self) -> Result<(), GpioError>;
}

/// Opens input lines.
pub trait PinProvider: Send + Sync {
    fn open(&self, config: &PinConfig) -> Result<Box<dyn InputPin>, GpioError>;
}
