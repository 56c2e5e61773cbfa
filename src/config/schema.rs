//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::gpio::PinLine;

/// Fallback host: the Raspberry Pi's zeroconf name.
pub const DEFAULT_ADDRESS: &str = "raspberrypi.local";

/// Fallback port of the remote button server.
pub const DEFAULT_PORT: u16 = 19054;

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Remote peer settings.
    pub remote: RemoteConfig,

    /// Button to GPIO line mapping.
    pub buttons: ButtonsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote peer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Host name or IP of the peer. Empty means "use the default".
    pub address: String,

    /// TCP port of the peer.
    pub port: u16,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_secs: 5,
        }
    }
}

/// One button's GPIO line.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct ButtonConfig {
    /// Button number, also the byte sent on the wire (1..=3).
    pub id: u8,

    /// GPIO controller number.
    pub controller: u32,

    /// Pin number on the controller.
    pub pin: u32,
}

impl ButtonConfig {
    pub fn line(&self) -> PinLine {
        PinLine::new(self.controller, self.pin)
    }
}

/// Button wiring. Serialized as a `[[buttons]]` array.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ButtonsConfig(pub Vec<ButtonConfig>);

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self(vec![
            ButtonConfig { id: 1, controller: 0, pin: 0 },
            ButtonConfig { id: 2, controller: 2, pin: 13 },
            ButtonConfig { id: 3, controller: 6, pin: 15 },
        ])
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
