//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint
//!     → connection.rs (TCP connect with timeout, unique ID)
//!     → split:
//!         inbound half  → relay::monitor (EOF / error detection)
//!         outbound half → output.rs (single writer task)
//!                             ↑
//!                         forwarders (any thread)
//! ```
//!
//! # Design Decisions
//! - Exactly one connection per run; it is never reused after closing
//! - The transport is abstracted so tests can run over in-memory pipes
//! - Writes are serialized by ownership, not by a lock around the socket

pub mod connection;
pub mod output;

pub use connection::{ConnectError, Connection, ConnectionId, InboundHalf, OutboundHalf, Transport};
pub use output::{ForwardError, OutputChannel, OutputTask};
