//! Remote endpoint resolution with fallback defaults.
//!
//! Host-supplied values are advisory: a missing or empty address and a
//! missing, unparsable or zero port fall back to the defaults instead of
//! failing startup.

use std::fmt;

use crate::config::schema::{RemoteConfig, DEFAULT_ADDRESS, DEFAULT_PORT};

/// Address and port of the remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Resolve raw host values, falling back to defaults.
    pub fn resolve(address: Option<&str>, port: Option<&str>) -> Self {
        let address = match address.map(str::trim) {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => {
                tracing::info!(fallback = DEFAULT_ADDRESS, "Note: using default address");
                DEFAULT_ADDRESS.to_string()
            }
        };

        let port = match port.map(|p| p.trim().parse::<u16>()) {
            Some(Ok(port)) if port > 0 => port,
            _ => {
                tracing::info!(fallback = DEFAULT_PORT, "Note: using default port");
                DEFAULT_PORT
            }
        };

        Self { address, port }
    }

    /// Resolve from the `[remote]` section, with optional overrides.
    pub fn from_config(
        remote: &RemoteConfig,
        address: Option<&str>,
        port: Option<&str>,
    ) -> Self {
        let address = address.unwrap_or(&remote.address);
        let configured_port = remote.port.to_string();
        let port = port.unwrap_or(&configured_port);
        Self::resolve(Some(address), Some(port))
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
