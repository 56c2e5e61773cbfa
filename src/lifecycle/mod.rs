//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (controller.rs + startup.rs):
//!     Resolve endpoint → Connect → Open pins → Register forwarders → Spawn monitor
//!
//! Shutdown (controller.rs + shutdown.rs):
//!     Explicit stop / peer disconnect → CAS gate → Cancel monitor
//!         → Close output → Close pins → Stopped
//!
//! Host (host.rs, signals.rs):
//!     on_start / on_stop hooks; SIGINT/SIGTERM → on_stop
//! ```
//!
//! # Design Decisions
//! - Ordered startup: connection first, pins only once it is open
//! - Fail fast: any startup error is fatal and rolls back what was acquired
//! - States only move forward; a bridge runs once

pub mod controller;
pub mod error;
pub mod host;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use controller::Bridge;
pub use error::BridgeError;
pub use host::Application;
pub use shutdown::Shutdown;
pub use state::LifecycleState;
