//! Shared outbound byte channel.
//!
//! # Responsibilities
//! - Accept bytes from any thread without blocking (driver callbacks)
//! - Serialize all writes through a single writer task
//! - Refuse new bytes once closing has begun
//!
//! # Design Decisions
//! - An unbounded queue keeps `send` synchronous; events are tiny and rare
//! - Only the writer task touches the outbound half, so writes never interleave
//! - Write errors are logged and swallowed; they never end the lifecycle
//! - Closing drops queued bytes: nothing is written after close begins
//! - A write stalled on a peer that stopped reading is abandoned on close

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Error returned by [`OutputChannel::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForwardError {
    #[error("output channel closed")]
    Closed,
}

/// Cloneable sending side, shared by every forwarder.
#[derive(Debug, Clone)]
pub struct OutputChannel {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<u8>>>>,
}

impl OutputChannel {
    /// Queue one byte for the writer task.
    pub fn send(&self, byte: u8) -> Result<(), ForwardError> {
        let tx = self.tx.lock().expect("output channel mutex poisoned");
        match tx.as_ref() {
            Some(tx) => tx.send(byte).map_err(|_| ForwardError::Closed),
            None => Err(ForwardError::Closed),
        }
    }

    /// Whether closing has begun.
    pub fn is_closed(&self) -> bool {
        self.tx.lock().expect("output channel mutex poisoned").is_none()
    }
}

/// Owning side of the channel: the writer task and its stop switch.
pub struct OutputTask<W> {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<u8>>>>,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<W>,
}

/// Spawn the writer task over `writer`.
pub fn spawn<W>(writer: W, peer: String) -> (OutputChannel, OutputTask<W>)
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));

    let handle = tokio::spawn(run_writer(writer, rx, stop_rx, peer));

    (
        OutputChannel { tx: Arc::clone(&tx) },
        OutputTask {
            tx,
            stop: stop_tx,
            handle,
        },
    )
}

impl<W> OutputTask<W>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    /// Stop accepting bytes, stop the writer and shut the outbound half down.
    pub async fn close(self) -> std::io::Result<()> {
        self.tx.lock().expect("output channel mutex poisoned").take();
        let _ = self.stop.send(());

        let mut writer = self.handle.await.map_err(std::io::Error::other)?;
        writer.shutdown().await
    }
}

async fn run_writer<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<u8>,
    mut stop: oneshot::Receiver<()>,
    peer: String,
) -> W
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            byte = rx.recv() => {
                let Some(byte) = byte else { break };
                tokio::select! {
                    biased;
                    _ = &mut stop => {
                        tracing::debug!(peer = %peer, byte, "Pending write abandoned on close");
                        break;
                    }
                    result = write_byte(&mut writer, byte) => {
                        if let Err(e) = result {
                            tracing::warn!(peer = %peer, byte, error = %e, "IO error while sending data");
                        }
                    }
                }
            }
        }
    }
    tracing::debug!(peer = %peer, "Output writer stopped");
    writer
}

async fn write_byte<W: AsyncWrite + Unpin>(writer: &mut W, byte: u8) -> std::io::Result<()> {
    writer.write_all(&[byte]).await?;
    writer.flush().await
}
