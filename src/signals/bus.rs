//! # Signal bus.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] shared by the manager,
//! every pump and every subscriber worker.
//!
//! ```text
//! Publishers (many):                 Listener (one):
//!   Manager  ──┐
//!   Pump 1   ──┼──────► Bus ───────► signal listener ────► SubscriberSet
//!   Pump N   ──┤  (broadcast chan)    (spawned by builder)
//!   Workers  ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: slow receivers observe `RecvError::Lagged(n)` and skip `n` items.
//! - **No persistence**: signals published with no receiver are lost.

use tokio::sync::broadcast;

use super::signal::Signal;

/// Broadcast channel for runtime signals.
///
/// Cheap to clone (internally an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Signal>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Signal>(capacity.max(1));
        Self { tx }
    }

    /// Publishes a signal to all active receivers; dropped if there are none.
    pub fn publish(&self, s: Signal) {
        let _ = self.tx.send(s);
    }

    /// Creates a new receiver that observes subsequent signals.
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }
}
