//! Pin listener that turns an edge into one wire byte.

use crate::gpio::{PinEvent, PinListener};
use crate::net::OutputChannel;
use crate::observability::metrics;
use crate::wire::ButtonId;

/// Forwards every edge of one button to the shared output channel.
///
/// Runs on whatever thread the GPIO driver delivers on. Send failures are
/// logged and swallowed: they never reach the driver and never end the
/// lifecycle.
#[derive(Debug, Clone)]
pub struct EventForwarder {
    button: ButtonId,
    output: OutputChannel,
}

impl EventForwarder {
    pub fn new(button: ButtonId, output: OutputChannel) -> Self {
        Self { button, output }
    }

    pub fn button(&self) -> ButtonId {
        self.button
    }
}

impl PinListener for EventForwarder {
    fn value_changed(&self, event: PinEvent) {
        tracing::info!(button = %self.button, value = event.value, "Button {} pushed", self.button);

        match self.output.send(self.button.as_byte()) {
            Ok(()) => metrics::record_event_queued(self.button),
            Err(e) => {
                tracing::warn!(button = %self.button, error = %e, "IO error while sending data");
                metrics::record_event_dropped(self.button);
            }
        }
    }
}
