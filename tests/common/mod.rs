//! Shared utilities for integration testing.

use std::time::Duration;

use button_bridge::config::{BridgeConfig, Endpoint};
use button_bridge::gpio::{PinLine, SimulatedGpio};
use button_bridge::lifecycle::Bridge;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Default button lines, in button order.
#[allow(dead_code)]
pub const LINES: [PinLine; 3] = [
    PinLine { controller: 0, pin: 0 },
    PinLine { controller: 2, pin: 13 },
    PinLine { controller: 6, pin: 15 },
];

/// A listening test peer on an ephemeral localhost port.
pub async fn start_peer() -> (TcpListener, Endpoint) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, Endpoint::new("127.0.0.1", port))
}

/// An endpoint nobody listens on.
#[allow(dead_code)]
pub async fn unreachable_endpoint() -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Endpoint::new("127.0.0.1", port)
}

/// A bridge with the default wiring over a fresh simulated GPIO bank.
pub fn bridge() -> (Bridge<SimulatedGpio>, SimulatedGpio) {
    let gpio = SimulatedGpio::new();
    let bridge = Bridge::new(gpio.clone(), &BridgeConfig::default()).unwrap();
    (bridge, gpio)
}

/// Start `bridge` against a fresh peer and return the peer's socket.
#[allow(dead_code)]
pub async fn start_connected(bridge: &Bridge<SimulatedGpio>) -> TcpStream {
    let (listener, endpoint) = start_peer().await;
    bridge.start(&endpoint).await.unwrap();
    let (socket, _) = listener.accept().await.unwrap();
    socket
}

/// Read exactly `n` bytes from the peer socket, bounded by [`WAIT`].
#[allow(dead_code)]
pub async fn read_bytes(socket: &mut TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    tokio::time::timeout(WAIT, socket.read_exact(&mut buf))
        .await
        .expect("timed out waiting for bytes")
        .unwrap();
    buf
}

/// Wait until the peer sees end of stream, returning any bytes before it.
#[allow(dead_code)]
pub async fn read_to_eof(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    tokio::time::timeout(WAIT, socket.read_to_end(&mut buf))
        .await
        .expect("timed out waiting for EOF")
        .unwrap();
    buf
}
