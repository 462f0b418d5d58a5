//! # Signal subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for plugging observers into the runtime.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `SignalKind::SubscriberPanicked`)
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use proactive::{Signal, SignalKind, Subscribe};
//!
//! #[derive(Default)]
//! struct DeliveryCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for DeliveryCounter {
//!     async fn on_signal(&self, s: &Signal) {
//!         if s.kind == SignalKind::NotificationDelivered {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "delivery-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::signals::Signal;

/// Observer of runtime signals.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single signal (FIFO per subscriber, called from its worker task).
    async fn on_signal(&self, signal: &Signal);

    /// Returns the subscriber name used in overflow/panic signals.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity (clamped to a minimum of 1).
    ///
    /// When full, new signals are dropped for this subscriber only and a
    /// `SubscriberOverflow` signal is published.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
