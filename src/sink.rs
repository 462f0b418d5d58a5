//! # Broadcast sink capability.
//!
//! A [`BroadcastSink`] delivers a [`Notification`] to every current downstream subscriber,
//! best effort. The manager catches and reports every failure; a failing sink never stops
//! the consumer loop or the source that produced the event.
//!
//! Built-in sinks:
//! - [`SinkFn`]: closure-backed sink (wrap an existing websocket/chat broadcast function);
//! - [`ChannelSink`]: in-process hub over [`tokio::sync::broadcast`]; each downstream
//!   consumer calls [`ChannelSink::subscribe`].
//!
//! ## Example
//! ```rust
//! use proactive::{SinkFn, SinkError, Notification};
//!
//! let sink = SinkFn::arc(|n: Notification| async move {
//!     println!("[{}] {}", n.origin, n.text);
//!     Ok::<_, SinkError>(())
//! });
//! # let _ = sink;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::SinkError;
use crate::notification::Notification;

/// Delivery capability supplied by the host application.
#[async_trait]
pub trait BroadcastSink: Send + Sync + 'static {
    /// Delivers `notification` to all current subscribers.
    async fn broadcast(&self, notification: &Notification) -> Result<(), SinkError>;

    /// Returns the sink name used in logs.
    fn name(&self) -> &str {
        "sink"
    }
}

/// Closure-backed sink.
///
/// Wraps `F: Fn(Notification) -> Fut`; each call gets its own clone of the notification.
pub struct SinkFn<F> {
    f: F,
}

impl<F> SinkFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the sink and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> BroadcastSink for SinkFn<F>
where
    F: Fn(Notification) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SinkError>> + Send + 'static,
{
    async fn broadcast(&self, notification: &Notification) -> Result<(), SinkError> {
        (self.f)(notification.clone()).await
    }

    fn name(&self) -> &str {
        "sink_fn"
    }
}

/// In-process fan-out hub.
///
/// ### Properties
/// - Every receiver created by [`subscribe`](Self::subscribe) gets its own copy.
/// - Having no receivers is **not** an error (best effort).
/// - Slow receivers observe `RecvError::Lagged` and skip the oldest notifications.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: broadcast::Sender<Notification>,
}

impl ChannelSink {
    /// Creates a hub retaining at most `capacity` undelivered notifications (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Registers a new downstream consumer.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of live downstream consumers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl BroadcastSink for ChannelSink {
    async fn broadcast(&self, notification: &Notification) -> Result<(), SinkError> {
        // `send` only fails when nobody listens.
        let _ = self.tx.send(notification.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "channel"
    }
}
