//! # Runtime signals emitted by the manager, pumps and subscriber workers.
//!
//! The [`SignalKind`] enum classifies signals across four groups:
//! - **Manager lifecycle**: start, stop, grace handling, delivery gating
//! - **Source lifecycle**: a pump starting, failing one production, ending
//! - **Event flow**: what happened to one event (discarded, suppressed, delivered, ...)
//! - **Subscriber health**: overflow and panics inside observers
//!
//! The [`Signal`] struct carries optional metadata (source name, category, reason, ...).
//!
//! ## Ordering guarantees
//! Each signal has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use proactive::{Signal, SignalKind};
//!
//! let s = Signal::new(SignalKind::SourceFailed)
//!     .with_source("rss:example")
//!     .with_reason("fetch from https://example.com/feed failed: 503");
//!
//! assert_eq!(s.kind, SignalKind::SourceFailed);
//! assert_eq!(s.source.as_deref(), Some("rss:example"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for signal ordering.
static SIGNAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    // === Manager lifecycle ===
    /// `run()` started.
    ///
    /// Sets:
    /// - `count`: number of registered sources
    ManagerStarted,

    /// `run()` was called while a run was already active; the call was a no-op.
    AlreadyRunning,

    /// A detached start was requested without any source; nothing was started.
    EmptySources,

    /// Stop requested (explicit `stop()` or shutdown signal).
    StopRequested,

    /// Teardown finished; the manager is idle again.
    ///
    /// Sets:
    /// - `count`: events dropped from the queue during teardown
    ManagerStopped,

    /// Some pumps did not stop within the grace period and were aborted.
    ///
    /// Sets:
    /// - `duration_ms`: configured grace
    /// - `reason`: comma-separated source names
    GraceExceeded,

    /// The consumer loop faulted; teardown follows.
    ///
    /// Sets:
    /// - `reason`: panic payload
    ConsumerFaulted,

    /// Delivery gate opened.
    DeliveryEnabled,

    /// Delivery gate closed.
    DeliveryDisabled,

    // === Source lifecycle ===
    /// A pump started draining its source.
    ///
    /// Sets:
    /// - `source`: source name
    SourceStarted,

    /// One production failed; the source keeps going.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: error message
    SourceFailed,

    /// The source ended (sequence exhausted, cancellation, or queue closed).
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: `exhausted` | `cancelled` | `queue_closed`
    /// - `count`: events forwarded by this pump
    SourceEnded,

    /// The source yielded an unrecoverable error and ended.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: error message
    SourceDead,

    /// The pump panicked.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: panic payload
    SourcePanicked,

    // === Event flow ===
    /// An event was dequeued by the consumer.
    ///
    /// Sets:
    /// - `source`, `category`
    EventReceived,

    /// An event was dropped because delivery is disabled.
    EventDiscarded,

    /// The decision policy said no.
    EventSuppressed,

    /// The decision policy failed; the event was suppressed.
    ///
    /// Sets:
    /// - `source`, `category`
    /// - `reason`: error message
    DecisionFailed,

    /// The sink accepted a notification.
    ///
    /// Sets:
    /// - `source`, `category`
    /// - `reason`: notification text
    NotificationDelivered,

    /// The sink failed; the loop continues.
    ///
    /// Sets:
    /// - `source`, `category`
    /// - `reason`: error message
    DeliveryFailed,

    // === Subscriber health ===
    /// Subscriber panicked during signal processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Subscriber dropped a signal (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: `full` | `closed`
    SubscriberOverflow,
}

/// Runtime signal with optional metadata.
#[derive(Clone, Debug)]
pub struct Signal {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Signal classification.
    pub kind: SignalKind,

    /// Source (or subscriber) name, if applicable.
    pub source: Option<Arc<str>>,
    /// Event category, if applicable.
    pub category: Option<Arc<str>>,
    /// Human-readable reason (errors, notification text, ...).
    pub reason: Option<Arc<str>>,
    /// Kind-specific counter.
    pub count: Option<u32>,
    /// Kind-specific duration in milliseconds (compact).
    pub duration_ms: Option<u32>,
}

impl Signal {
    /// Creates a new signal of the given kind with current timestamp and next sequence number.
    pub fn new(kind: SignalKind) -> Self {
        Self {
            seq: SIGNAL_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            category: None,
            reason: None,
            count: None,
            duration_ms: None,
        }
    }

    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[inline]
    pub fn with_category(mut self, category: impl Into<Arc<str>>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a counter (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    /// Attaches a duration (stored as milliseconds).
    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.duration_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow signal.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Signal::new(SignalKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic signal.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Signal::new(SignalKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Signal::new(SignalKind::EventReceived);
        let b = Signal::new(SignalKind::EventReceived);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn counters_and_durations_saturate() {
        let s = Signal::new(SignalKind::GraceExceeded)
            .with_duration(Duration::from_secs(u64::MAX / 2))
            .with_count(usize::MAX);
        assert_eq!(s.duration_ms, Some(u32::MAX));
        assert_eq!(s.count, Some(u32::MAX));
    }
}
