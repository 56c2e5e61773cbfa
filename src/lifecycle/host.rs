//! Host runtime entry points.
//!
//! The supervising runtime drives the bridge through two hooks:
//! `on_start` (resolve the endpoint, connect, wire pins) and `on_stop`
//! (release everything and report the final state for teardown).

use crate::config::{BridgeConfig, Endpoint};
use crate::gpio::PinProvider;
use crate::lifecycle::controller::Bridge;
use crate::lifecycle::error::BridgeError;
use crate::lifecycle::state::LifecycleState;

/// A bridge bound to its resolved endpoint.
pub struct Application<P> {
    bridge: Bridge<P>,
    endpoint: Endpoint,
}

impl<P> Application<P>
where
    P: PinProvider + 'static,
{
    /// Build the application. `address` and `port` override the config file
    /// and fall back to defaults when missing or invalid.
    pub fn new(
        provider: P,
        config: &BridgeConfig,
        address: Option<&str>,
        port: Option<&str>,
    ) -> Result<Self, BridgeError> {
        let endpoint = Endpoint::from_config(&config.remote, address, port);
        let bridge = Bridge::new(provider, config)?;
        Ok(Self { bridge, endpoint })
    }

    pub fn bridge(&self) -> &Bridge<P> {
        &self.bridge
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Start hook. Failure is fatal; nothing stays acquired.
    pub async fn on_start(&self) -> Result<(), BridgeError> {
        tracing::info!(endpoint = %self.endpoint, "Starting button bridge application");
        self.bridge.start(&self.endpoint).await
    }

    /// Stop hook. Returns once the bridge is `Stopped`, or immediately if it
    /// never started.
    pub async fn on_stop(&self) -> LifecycleState {
        tracing::info!("Stopping button bridge application");
        self.bridge.shutdown().await;
        match self.bridge.state() {
            LifecycleState::NotStarted => LifecycleState::NotStarted,
            _ => self.bridge.wait_for_stopped().await,
        }
    }
}
