//! End-to-end lifecycle tests over real localhost sockets.

use std::time::Duration;

use button_bridge::config::BridgeConfig;
use button_bridge::gpio::{GpioError, SimulatedGpio};
use button_bridge::lifecycle::{Application, BridgeError, LifecycleState};
use button_bridge::net::{ConnectError, Connection};
use button_bridge::wire::ButtonId;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

mod common;

use common::{LINES, WAIT};

#[tokio::test]
async fn each_button_sends_exactly_its_byte() {
    let (bridge, gpio) = common::bridge();
    let mut peer = common::start_connected(&bridge).await;

    for (button, line) in ButtonId::ALL.into_iter().zip(LINES) {
        assert!(gpio.toggle(line));
        assert_eq!(common::read_bytes(&mut peer, 1).await, vec![button.as_byte()]);
    }

    assert!(bridge.shutdown().await);
    // Nothing else was ever written.
    assert!(common::read_to_eof(&mut peer).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_edges_arrive_intact() {
    const EDGES: usize = 200;

    let (bridge, gpio) = common::bridge();
    let mut peer = common::start_connected(&bridge).await;

    let drivers: Vec<_> = LINES
        .into_iter()
        .map(|line| {
            let gpio = gpio.clone();
            std::thread::spawn(move || {
                for _ in 0..EDGES {
                    assert!(gpio.toggle(line));
                }
            })
        })
        .collect();
    for driver in drivers {
        driver.join().unwrap();
    }

    let bytes = common::read_bytes(&mut peer, EDGES * 3).await;
    for button in ButtonId::ALL {
        let count = bytes.iter().filter(|b| **b == button.as_byte()).count();
        assert_eq!(count, EDGES, "button {} count", button);
    }

    bridge.shutdown().await;
    assert!(common::read_to_eof(&mut peer).await.is_empty());
}

#[tokio::test]
async fn peer_close_stops_the_bridge_once() {
    let (bridge, gpio) = common::bridge();
    let peer = common::start_connected(&bridge).await;
    assert_eq!(bridge.state(), LifecycleState::Running);

    drop(peer);

    let state = tokio::time::timeout(WAIT, bridge.wait_for_stopped())
        .await
        .expect("bridge did not stop after peer close");
    assert_eq!(state, LifecycleState::Stopped);

    for line in LINES {
        assert_eq!(gpio.close_count(line), 1);
        assert!(!gpio.is_open(line));
    }

    // Already stopped: no-op, no double close.
    assert!(!bridge.shutdown().await);
    for line in LINES {
        assert_eq!(gpio.close_count(line), 1);
    }
}

#[tokio::test]
async fn inbound_data_is_ignored() {
    let (bridge, gpio) = common::bridge();
    let mut peer = common::start_connected(&bridge).await;

    peer.write_all(b"hello").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(bridge.state(), LifecycleState::Running);

    gpio.toggle(LINES[0]);
    assert_eq!(common::read_bytes(&mut peer, 1).await, vec![1]);

    bridge.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn explicit_stop_racing_disconnect_releases_once() {
    for _ in 0..10 {
        let (bridge, gpio) = common::bridge();
        let peer = common::start_connected(&bridge).await;

        let stoppers: Vec<_> = (0..4)
            .map(|_| {
                let bridge = bridge.clone();
                tokio::spawn(async move { bridge.shutdown().await })
            })
            .collect();
        drop(peer);

        let mut winners = 0;
        for stopper in stoppers {
            if stopper.await.unwrap() {
                winners += 1;
            }
        }
        // The monitor may have won instead.
        assert!(winners <= 1);

        let state = tokio::time::timeout(WAIT, bridge.wait_for_stopped())
            .await
            .unwrap();
        assert_eq!(state, LifecycleState::Stopped);
        for line in LINES {
            assert_eq!(gpio.close_count(line), 1);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_explicit_stops_have_one_winner() {
    let (bridge, gpio) = common::bridge();
    let mut peer = common::start_connected(&bridge).await;

    let stoppers: Vec<_> = (0..8)
        .map(|_| {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.shutdown().await })
        })
        .collect();

    let mut winners = 0;
    for stopper in stoppers {
        if stopper.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    bridge.wait_for_stopped().await;
    for line in LINES {
        assert_eq!(gpio.close_count(line), 1);
    }
    assert!(common::read_to_eof(&mut peer).await.is_empty());
}

#[tokio::test]
async fn shutdown_is_not_held_up_by_a_peer_that_stopped_reading() {
    let (bridge, gpio) = common::bridge();
    let (local, _peer) = tokio::io::duplex(1);
    bridge
        .start_with(Connection::from_stream(local, "stalled"))
        .await
        .unwrap();

    for _ in 0..4 {
        gpio.toggle(LINES[0]);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let released = tokio::time::timeout(WAIT, bridge.shutdown())
        .await
        .expect("shutdown hung on a stalled peer");
    assert!(released);
    assert_eq!(bridge.state(), LifecycleState::Stopped);
    for line in LINES {
        assert_eq!(gpio.close_count(line), 1);
    }
}

#[tokio::test]
async fn unreachable_peer_fails_fast_without_pins() {
    let (bridge, gpio) = common::bridge();
    let endpoint = common::unreachable_endpoint().await;

    let err = tokio::time::timeout(WAIT, bridge.start(&endpoint))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, BridgeError::Connect(ConnectError::Io { .. })));

    assert_eq!(bridge.state(), LifecycleState::NotStarted);
    for line in LINES {
        assert_eq!(gpio.open_count(line), 0);
    }
}

#[tokio::test]
async fn pin_failure_releases_the_connection() {
    let (bridge, gpio) = common::bridge();
    gpio.fail_open(LINES[1]);

    let (listener, endpoint) = common::start_peer().await;
    let err = bridge.start(&endpoint).await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Gpio {
            button: ButtonId::Two,
            source: GpioError::Unavailable { .. }
        }
    ));
    assert_eq!(bridge.state(), LifecycleState::NotStarted);

    // The connection that was opened is closed again.
    let (mut peer, _) = listener.accept().await.unwrap();
    assert!(common::read_to_eof(&mut peer).await.is_empty());

    // The pin opened before the failure is closed again.
    assert_eq!(gpio.close_count(LINES[0]), 1);
    assert!(!gpio.is_open(LINES[0]));
    assert_eq!(gpio.open_count(LINES[2]), 0);
}

#[tokio::test]
async fn application_end_to_end_on_default_port() {
    let listener = TcpListener::bind("127.0.0.1:19054").await.unwrap();
    let gpio = SimulatedGpio::new();
    let app = Application::new(
        gpio.clone(),
        &BridgeConfig::default(),
        Some("localhost"),
        Some("19054"),
    )
    .unwrap();

    app.on_start().await.unwrap();
    let (mut peer, _) = listener.accept().await.unwrap();

    assert!(gpio.toggle(LINES[1]));
    assert_eq!(common::read_bytes(&mut peer, 1).await, vec![0x02]);

    drop(peer);

    let state = tokio::time::timeout(WAIT, app.bridge().wait_for_stopped())
        .await
        .expect("application did not stop");
    assert_eq!(state, LifecycleState::Stopped);
    for line in LINES {
        assert!(!gpio.is_open(line));
        assert_eq!(gpio.close_count(line), 1);
    }

    assert_eq!(app.on_stop().await, LifecycleState::Stopped);
}
