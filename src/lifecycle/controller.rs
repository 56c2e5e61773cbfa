//! Lifecycle controller: owns every resource of one bridge run.
//!
//! # Responsibilities
//! - Open the connection, then the pins, then wire forwarders
//! - Launch the connection monitor and return without waiting on it
//! - Release everything exactly once, whichever trigger gets there first
//!
//! # Design Decisions
//! - Connection failure aborts before any pin is touched
//! - Pin failure closes the connection again before reporting
//! - The Running → ShuttingDown compare-and-swap is the single shutdown gate
//! - A shutdown issued while a start is in flight waits for that start, then
//!   stops whatever it acquired
//! - Every release is attempted even if an earlier one fails

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::validation::validate_config;
use crate::config::{BridgeConfig, ConfigError, Endpoint};
use crate::gpio::{PinLine, PinProvider};
use crate::lifecycle::error::BridgeError;
use crate::lifecycle::shutdown::{release_output, release_pins, Shutdown};
use crate::lifecycle::startup::{acquire_pins, register_forwarders, ButtonPins};
use crate::lifecycle::state::{LifecycleState, StateCell};
use crate::net::{output, Connection, ConnectionId, OutboundHalf, OutputTask};
use crate::relay::{monitor, MonitorExit};
use crate::wire::ButtonId;

/// Everything acquired by a successful start.
struct Resources {
    connection_id: ConnectionId,
    peer: String,
    output: OutputTask<OutboundHalf>,
    pins: ButtonPins,
    monitor: JoinHandle<MonitorExit>,
}

struct Inner<P> {
    provider: P,
    buttons: Vec<(ButtonId, PinLine)>,
    connect_timeout: Duration,
    state: StateCell,
    resources: Mutex<Option<Resources>>,
    shutdown: Shutdown,
    start_lock: tokio::sync::Mutex<()>,
}

/// The button bridge. Cloning yields another handle onto the same run.
pub struct Bridge<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for Bridge<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> Bridge<P>
where
    P: PinProvider + 'static,
{
    /// Create a bridge over `provider`, wired per `config.buttons`.
    pub fn new(provider: P, config: &BridgeConfig) -> Result<Self, BridgeError> {
        validate_config(config).map_err(|errors| BridgeError::Config(ConfigError::Validation(errors)))?;

        let mut buttons: Vec<(ButtonId, PinLine)> = config
            .buttons
            .0
            .iter()
            .filter_map(|button| ButtonId::try_from(button.id).ok().map(|id| (id, button.line())))
            .collect();
        buttons.sort_by_key(|(id, _)| *id);

        Ok(Self {
            inner: Arc::new(Inner {
                provider,
                buttons,
                connect_timeout: Duration::from_secs(config.remote.connect_timeout_secs),
                state: StateCell::new(),
                resources: Mutex::new(None),
                shutdown: Shutdown::new(),
                start_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.inner.state.get()
    }

    /// Wait until the bridge is `Stopped`.
    ///
    /// Never resolves for a bridge that was never started.
    pub async fn wait_for_stopped(&self) -> LifecycleState {
        self.inner.state.wait_for(LifecycleState::Stopped).await
    }

    /// Button to GPIO line mapping in use.
    pub fn buttons(&self) -> &[(ButtonId, PinLine)] {
        &self.inner.buttons
    }

    /// Connect to `endpoint` and start.
    pub async fn start(&self, endpoint: &Endpoint) -> Result<(), BridgeError> {
        let _starting = self.inner.start_lock.lock().await;
        self.ensure_not_started()?;

        tracing::info!(endpoint = %endpoint, "Connecting to remote button server");
        let connection = Connection::connect(endpoint, self.inner.connect_timeout)
            .await
            .inspect_err(|e| tracing::error!(endpoint = %endpoint, error = %e, "Connection failed"))?;

        self.start_locked(connection).await
    }

    /// Start over an already opened connection.
    pub async fn start_with(&self, connection: Connection) -> Result<(), BridgeError> {
        let _starting = self.inner.start_lock.lock().await;
        self.ensure_not_started()?;
        self.start_locked(connection).await
    }

    /// Startup body. Caller holds `start_lock`.
    async fn start_locked(&self, connection: Connection) -> Result<(), BridgeError> {
        let connection_id = connection.id();
        let peer = connection.peer().to_string();
        tracing::info!(connection_id = %connection_id, peer = %peer, "Connected to remote button server");

        let (inbound, outbound) = connection.into_split();
        let (output, output_task) = output::spawn(outbound, peer.clone());

        tracing::info!("Creating GPIO pins for buttons 1, 2 and 3");
        let pins = match acquire_pins(&self.inner.provider, &self.inner.buttons)
            .and_then(|pins| register_forwarders(pins, &output))
        {
            Ok(pins) => pins,
            Err(e) => {
                drop(inbound);
                release_output(output_task, &peer).await;
                tracing::info!(connection_id = %connection_id, "Connection released after failed startup");
                return Err(e);
            }
        };

        let cancel = self.inner.shutdown.subscribe();
        let bridge = self.clone();

        {
            let mut slot = self.inner.resources.lock().expect("bridge resources mutex poisoned");
            // Must be Running before the monitor can see a disconnect.
            self.inner.state.advance(LifecycleState::NotStarted, LifecycleState::Running);
            let monitor = monitor::spawn(inbound, cancel, peer.clone(), move || async move {
                bridge.release(false).await;
            });
            *slot = Some(Resources {
                connection_id,
                peer,
                output: output_task,
                pins,
                monitor,
            });
        }

        tracing::info!(connection_id = %connection_id, "Bridge running");
        Ok(())
    }

    /// Release every resource. Safe to call any number of times, from any
    /// task, concurrently with a peer disconnect.
    ///
    /// Returns `true` only for the call that performed the release.
    pub async fn shutdown(&self) -> bool {
        if self.state() == LifecycleState::NotStarted {
            // Let an in-flight start finish so its resources are released here.
            drop(self.inner.start_lock.lock().await);
        }
        self.release(true).await
    }

    async fn release(&self, join_monitor: bool) -> bool {
        if !self
            .inner
            .state
            .advance(LifecycleState::Running, LifecycleState::ShuttingDown)
        {
            tracing::debug!(state = ?self.state(), "Shutdown already handled");
            return false;
        }

        tracing::info!("Stopping button bridge");

        let resources = self
            .inner
            .resources
            .lock()
            .expect("bridge resources mutex poisoned")
            .take();

        if let Some(resources) = resources {
            let Resources {
                connection_id,
                peer,
                output,
                pins,
                monitor,
            } = resources;

            // Inbound half: the monitor drops it on cancel.
            self.inner.shutdown.trigger();
            if join_monitor {
                match monitor.await {
                    Ok(exit) => tracing::debug!(exit = ?exit, "Connection monitor finished"),
                    Err(e) => tracing::warn!(error = %e, "Connection monitor failed"),
                }
            }

            release_output(output, &peer).await;

            let failures = release_pins(pins);
            if failures > 0 {
                tracing::warn!(failures, "Some GPIO pins failed to close");
            }

            tracing::info!(connection_id = %connection_id, peer = %peer, "Connection closed");
        }

        self.inner
            .state
            .advance(LifecycleState::ShuttingDown, LifecycleState::Stopped);
        tracing::info!("Button bridge stopped");
        true
    }

    fn ensure_not_started(&self) -> Result<(), BridgeError> {
        match self.state() {
            LifecycleState::NotStarted => Ok(()),
            state => Err(BridgeError::AlreadyStarted(state)),
        }
    }
}
