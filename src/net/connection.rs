//! The single stream connection to the remote peer.
//!
//! # Responsibilities
//! - Open the TCP stream with a bounded connect timeout
//! - Tag each connection with a unique ID for tracing
//! - Split the stream into an inbound half (monitor) and an outbound half
//!   (output channel)

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpStream;

use crate::config::Endpoint;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Any bidirectional byte stream the bridge can run over.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Inbound direction, read only by the connection monitor.
pub type InboundHalf = ReadHalf<Box<dyn Transport>>;

/// Outbound direction, written only by the output channel's writer task.
pub type OutboundHalf = WriteHalf<Box<dyn Transport>>;

/// Errors opening the connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("unable to connect to {endpoint}: {source}")]
    Io {
        endpoint: Endpoint,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {endpoint} timed out after {secs} seconds")]
    Timeout { endpoint: Endpoint, secs: u64 },
}

/// An open stream to the peer, not yet split.
pub struct Connection {
    id: ConnectionId,
    peer: String,
    stream: Box<dyn Transport>,
}

impl Connection {
    /// Open a TCP connection to `endpoint`.
    pub async fn connect(endpoint: &Endpoint, timeout: Duration) -> Result<Self, ConnectError> {
        let connect = TcpStream::connect((endpoint.address.as_str(), endpoint.port));

        let stream = match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(ConnectError::Io {
                    endpoint: endpoint.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(ConnectError::Timeout {
                    endpoint: endpoint.clone(),
                    secs: timeout.as_secs(),
                })
            }
        };

        // One byte per event: don't let Nagle hold it back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| endpoint.to_string());

        Ok(Self::from_stream(stream, peer))
    }

    /// Wrap an already established stream.
    pub fn from_stream<S: Transport>(stream: S, peer: impl Into<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            peer: peer.into(),
            stream: Box::new(stream),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Peer address as reported by the transport.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Split into the inbound and outbound halves.
    pub fn into_split(self) -> (InboundHalf, OutboundHalf) {
        tokio::io::split(self.stream)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}
