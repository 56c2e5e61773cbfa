//! Lifecycle error definitions.

use thiserror::Error;

use crate::config::ConfigError;
use crate::gpio::GpioError;
use crate::lifecycle::LifecycleState;
use crate::net::ConnectError;
use crate::wire::ButtonId;

/// Errors surfaced to the host. Only startup can fail.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The connection to the peer could not be opened.
    #[error("Unable to connect to remote button server: {0}")]
    Connect(#[from] ConnectError),

    /// A button's GPIO pin could not be acquired.
    #[error("Unable to open GPIO pin for button {button}: {source}")]
    Gpio {
        button: ButtonId,
        #[source]
        source: GpioError,
    },

    /// `start` was called outside `NotStarted`.
    #[error("Bridge cannot start from state {0:?}")]
    AlreadyStarted(LifecycleState),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
