//! Button bridge: relays three GPIO buttons to a remote peer over TCP.
//!
//! # Architecture Overview
//!
//! ```text
//!   GPIO lines (driver threads)                       remote peer
//!   ┌────────┐                                      ┌────────────┐
//!   │ btn 1  │──┐                                   │            │
//!   │ btn 2  │──┼─▶ forwarders ─▶ output channel ──▶│  1 byte /  │
//!   │ btn 3  │──┘    (relay)       (net, writer)    │   event    │
//!   └────────┘                                      │            │
//!                                                   │            │
//!   lifecycle ◀── monitor (relay) ◀── inbound EOF ──│   close    │
//!   controller                                      └────────────┘
//! ```
//!
//! Each pin transition sends the button number (1, 2 or 3) as a single byte.
//! When the peer closes the connection the monitor shuts the bridge down and
//! every resource is released exactly once.

pub mod config;
pub mod gpio;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;
pub mod wire;

pub use config::{BridgeConfig, Endpoint};
pub use gpio::SimulatedGpio;
pub use lifecycle::{Application, Bridge, BridgeError, LifecycleState};
pub use wire::ButtonId;
