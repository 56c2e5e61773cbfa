//! Connection liveness monitor.
//!
//! # States
//! - Monitoring: blocked on a one-byte read of the inbound half
//! - Terminated: the read hit EOF or failed, or shutdown cancelled it
//!
//! # State Transitions
//! ```text
//! Monitoring → Terminated(PeerClosed): read returned 0 bytes
//! Monitoring → Terminated(ReadError):  read failed
//! Monitoring → Terminated(Cancelled):  shutdown signal received
//! ```
//!
//! Inbound content is drained and ignored. Only closure matters.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Why the monitor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// The peer closed its side of the stream.
    PeerClosed,
    /// Reading the stream failed.
    ReadError,
    /// Shutdown released the inbound half.
    Cancelled,
}

impl MonitorExit {
    /// Whether this exit means the peer is gone and the bridge must stop.
    pub fn is_disconnect(self) -> bool {
        !matches!(self, MonitorExit::Cancelled)
    }
}

/// Read until the stream ends, fails or is cancelled.
///
/// The inbound half is dropped when this returns.
pub async fn watch<R>(mut inbound: R, mut cancel: broadcast::Receiver<()>, peer: &str) -> MonitorExit
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1];
    loop {
        tokio::select! {
            read = inbound.read(&mut buf) => match read {
                Ok(0) => {
                    tracing::info!(peer = %peer, "Stream has been closed");
                    return MonitorExit::PeerClosed;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(peer = %peer, error = %e, "IO error while monitoring the connection");
                    return MonitorExit::ReadError;
                }
            },
            _ = cancel.recv() => {
                tracing::debug!(peer = %peer, "Connection monitor cancelled");
                return MonitorExit::Cancelled;
            }
        }
    }
}

/// Spawn the monitor task.
///
/// On disconnect (EOF or read error) `on_disconnect` runs once, after the
/// inbound half has been dropped.
pub fn spawn<R, F, Fut>(
    inbound: R,
    cancel: broadcast::Receiver<()>,
    peer: String,
    on_disconnect: F,
) -> JoinHandle<MonitorExit>
where
    R: AsyncRead + Send + Unpin + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let exit = watch(inbound, cancel, &peer).await;
        if exit.is_disconnect() {
            on_disconnect().await;
        }
        exit
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn eof_ends_monitoring() {
        let (local, mut remote) = tokio::io::duplex(16);
        let (_tx, rx) = broadcast::channel(1);

        remote.write_all(b"ignored").await.unwrap();
        drop(remote);

        assert_eq!(watch(local, rx, "test").await, MonitorExit::PeerClosed);
    }

    #[tokio::test]
    async fn cancel_releases_the_read() {
        let (local, _remote) = tokio::io::duplex(16);
        let (tx, rx) = broadcast::channel(1);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = spawn(local, rx, "test".into(), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), MonitorExit::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disconnect_runs_callback_once() {
        let (local, remote) = tokio::io::duplex(16);
        let (_tx, rx) = broadcast::channel(1);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = spawn(local, rx, "test".into(), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        drop(remote);
        assert_eq!(handle.await.unwrap(), MonitorExit::PeerClosed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
