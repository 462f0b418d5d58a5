//! # LogWriter: tracing bridge for runtime signals.
//!
//! A subscriber that forwards every [`Signal`] to `tracing` with structured fields.
//! Errors and faults are logged at `warn`/`error`, lifecycle at `info`,
//! per-event flow at `debug`.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO  proactive: manager started sources=3
//! INFO  proactive: source started source="ticker"
//! DEBUG proactive: event suppressed source="rss:example" category="feed"
//! INFO  proactive: notification delivered source="ticker" category="tick" text="Send a short ..."
//! WARN  proactive: source failed source="rss:example" reason="fetch from ... failed"
//! INFO  proactive: manager stopped dropped=0
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::signals::{Signal, SignalKind};
use crate::subscribers::Subscribe;

/// Signal-to-tracing subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_signal(&self, s: &Signal) {
        let source = s.source.as_deref().unwrap_or("-");
        let category = s.category.as_deref().unwrap_or("-");
        let reason = s.reason.as_deref().unwrap_or("");

        match s.kind {
            SignalKind::ManagerStarted => {
                info!(target: "proactive", sources = s.count, "manager started");
            }
            SignalKind::AlreadyRunning => {
                warn!(target: "proactive", "run requested while already running; ignored");
            }
            SignalKind::EmptySources => {
                warn!(target: "proactive", "no event sources provided; nothing started");
            }
            SignalKind::StopRequested => {
                info!(target: "proactive", "stop requested");
            }
            SignalKind::ManagerStopped => {
                info!(target: "proactive", dropped = s.count, "manager stopped");
            }
            SignalKind::GraceExceeded => {
                error!(target: "proactive", grace_ms = s.duration_ms, stuck = reason, "grace exceeded; sources aborted");
            }
            SignalKind::ConsumerFaulted => {
                error!(target: "proactive", reason, "consumer loop faulted");
            }
            SignalKind::DeliveryEnabled => {
                info!(target: "proactive", "delivery enabled");
            }
            SignalKind::DeliveryDisabled => {
                info!(target: "proactive", "delivery disabled");
            }
            SignalKind::SourceStarted => {
                info!(target: "proactive", source, "source started");
            }
            SignalKind::SourceFailed => {
                warn!(target: "proactive", source, reason, "source failed");
            }
            SignalKind::SourceEnded => {
                info!(target: "proactive", source, reason, forwarded = s.count, "source ended");
            }
            SignalKind::SourceDead => {
                error!(target: "proactive", source, reason, "source ended with fatal error");
            }
            SignalKind::SourcePanicked => {
                error!(target: "proactive", source, reason, "source panicked");
            }
            SignalKind::EventReceived => {
                debug!(target: "proactive", source, category, "event received");
            }
            SignalKind::EventDiscarded => {
                debug!(target: "proactive", source, category, "event discarded; delivery disabled");
            }
            SignalKind::EventSuppressed => {
                debug!(target: "proactive", source, category, "event suppressed");
            }
            SignalKind::DecisionFailed => {
                warn!(target: "proactive", source, category, reason, "decision failed; event suppressed");
            }
            SignalKind::NotificationDelivered => {
                info!(target: "proactive", source, category, text = reason, "notification delivered");
            }
            SignalKind::DeliveryFailed => {
                warn!(target: "proactive", source, category, reason, "delivery failed");
            }
            SignalKind::SubscriberOverflow => {
                warn!(target: "proactive", subscriber = source, reason, "subscriber dropped a signal");
            }
            SignalKind::SubscriberPanicked => {
                error!(target: "proactive", subscriber = source, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
