//! Application lifecycle state machine.
//!
//! # States
//! - NotStarted: nothing acquired
//! - Running: connection, pins and monitor are live
//! - ShuttingDown: one caller is releasing resources
//! - Stopped: everything released
//!
//! # State Transitions
//! ```text
//! NotStarted → Running:      startup completed
//! Running → ShuttingDown:    first shutdown trigger wins the CAS
//! ShuttingDown → Stopped:    releases finished
//! ```
//!
//! Transitions only move forward. The compare-and-swap from Running is the
//! single gate that makes shutdown run once.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::watch;

use crate::observability::metrics;

/// Coarse application state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    NotStarted = 0,
    Running = 1,
    ShuttingDown = 2,
    Stopped = 3,
}

impl From<u8> for LifecycleState {
    fn from(val: u8) -> Self {
        match val {
            1 => LifecycleState::Running,
            2 => LifecycleState::ShuttingDown,
            3 => LifecycleState::Stopped,
            _ => LifecycleState::NotStarted,
        }
    }
}

/// Atomic state plus a watch channel for observers.
#[derive(Debug)]
pub struct StateCell {
    state: AtomicU8,
    tx: watch::Sender<LifecycleState>,
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::NotStarted);
        Self {
            state: AtomicU8::new(LifecycleState::NotStarted as u8),
            tx,
        }
    }

    pub fn get(&self) -> LifecycleState {
        LifecycleState::from(self.state.load(Ordering::SeqCst))
    }

    /// Move from `from` to `to` if the state is still `from`.
    ///
    /// Returns `false` if another caller already moved it, or if `to` would
    /// not be a forward move.
    pub fn advance(&self, from: LifecycleState, to: LifecycleState) -> bool {
        if to <= from {
            return false;
        }
        let moved = self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if moved {
            tracing::debug!(from = ?from, to = ?to, "Lifecycle transition");
            self.tx.send_replace(to);
            metrics::record_lifecycle_state(to);
        }
        moved
    }

    /// Wait until the state reaches at least `target`.
    pub async fn wait_for(&self, target: LifecycleState) -> LifecycleState {
        let mut rx = self.tx.subscribe();
        let reached = match rx.wait_for(|state| *state >= target).await {
            Ok(state) => *state,
            Err(_) => self.get(),
        };
        reached
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
