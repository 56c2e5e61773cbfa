//! Shutdown coordination and resource release.

use tokio::sync::broadcast;

use crate::gpio::InputPin;
use crate::net::{OutboundHalf, OutputTask};
use crate::wire::ButtonId;

/// Coordinator for the shutdown signal.
///
/// Long-running tasks (the connection monitor) subscribe before they start;
/// triggering releases whatever they hold.
#[derive(Debug)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Close every pin, logging failures without stopping early.
///
/// Returns the number of pins that failed to close.
pub(crate) fn release_pins(pins: Vec<(ButtonId, Box<dyn InputPin>)>) -> usize {
    let mut failures = 0;
    for (button, mut pin) in pins {
        let line = pin.line();
        match pin.close() {
            Ok(()) => tracing::debug!(button = %button, line = %line, "GPIO pin closed"),
            Err(e) => {
                failures += 1;
                tracing::warn!(button = %button, line = %line, error = %e, "Failed to close GPIO pin");
            }
        }
    }
    failures
}

/// Stop the writer task and shut the outbound half down, logging failure.
pub(crate) async fn release_output(output: OutputTask<OutboundHalf>, peer: &str) -> bool {
    match output.close().await {
        Ok(()) => {
            tracing::debug!(peer = %peer, "Output stream closed");
            true
        }
        Err(e) => {
            tracing::warn!(peer = %peer, error = %e, "Failed to close output stream");
            false
        }
    }
}
