//! Startup: pin acquisition and listener wiring.
//!
//! All three pins are opened before any listener is installed, so a failure
//! part way through never lets an edge reach the wire. On failure every pin
//! already opened is closed again.

use std::sync::Arc;

use crate::gpio::{InputPin, PinConfig, PinLine, PinProvider};
use crate::lifecycle::error::BridgeError;
use crate::lifecycle::shutdown::release_pins;
use crate::net::OutputChannel;
use crate::relay::EventForwarder;
use crate::wire::ButtonId;

pub(crate) type ButtonPins = Vec<(ButtonId, Box<dyn InputPin>)>;

/// Open one pin per button with the fixed button configuration.
pub(crate) fn acquire_pins<P>(provider: &P, buttons: &[(ButtonId, PinLine)]) -> Result<ButtonPins, BridgeError>
where
    P: PinProvider + ?Sized,
{
    let mut pins: ButtonPins = Vec::with_capacity(buttons.len());

    for &(button, line) in buttons {
        match provider.open(&PinConfig::button(line)) {
            Ok(pin) => {
                tracing::debug!(button = %button, line = %line, "GPIO pin opened");
                pins.push((button, pin));
            }
            Err(source) => {
                tracing::error!(button = %button, line = %line, error = %source, "Unable to open GPIO pin");
                release_pins(pins);
                return Err(BridgeError::Gpio { button, source });
            }
        }
    }

    Ok(pins)
}

/// Install one forwarder per pin, all sharing `output`.
pub(crate) fn register_forwarders(pins: ButtonPins, output: &OutputChannel) -> Result<ButtonPins, BridgeError> {
    let mut wired: ButtonPins = Vec::with_capacity(pins.len());
    let mut pending = pins.into_iter();

    while let Some((button, mut pin)) = pending.next() {
        let forwarder = Arc::new(EventForwarder::new(button, output.clone()));
        if let Err(source) = pin.set_listener(forwarder) {
            wired.push((button, pin));
            wired.extend(pending);
            release_pins(wired);
            return Err(BridgeError::Gpio { button, source });
        }
        wired.push((button, pin));
    }

    Ok(wired)
}
