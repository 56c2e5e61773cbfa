//! Event relay: the two concurrent halves of the bridge.
//!
//! # Data Flow
//! ```text
//! Outbound (one forwarder per button, driver threads):
//!     pin edge → forwarder.rs → OutputChannel::send(button byte)
//!
//! Inbound (one spawned task):
//!     peer close / read error → monitor.rs → lifecycle shutdown
//! ```
//!
//! # Design Decisions
//! - Forwarders never block on the socket and never trigger shutdown
//! - The monitor is the only reader of the inbound half
//! - Cancellation drops the inbound half; there is no polling

pub mod forwarder;
pub mod monitor;

pub use forwarder::EventForwarder;
pub use monitor::MonitorExit;
