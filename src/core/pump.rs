//! # Pump: drains one source into the merge queue.
//!
//! One pump task runs per registered source.
//!
//! ```text
//! SourceStarted
//!   loop:
//!     ctx cancelled        → SourceEnded(cancelled)
//!     stream ended         → SourceEnded(exhausted)
//!     Ok(event)            → queue.send(Envelope) ── closed → SourceEnded(queue_closed)
//!     Err(non-terminal)    → SourceFailed, keep going
//!     Err(Fatal)           → SourceDead
//!     Err(Canceled)        → SourceEnded(cancelled)
//!   panic anywhere         → SourcePanicked
//! ```
//!
//! ## Rules
//! - The stream is dropped as soon as the pump returns; nothing is polled after cancellation.
//! - Per-source order is preserved; the queue is unbounded, so forwarding never waits.
//! - The task always resolves to the source name so the manager can report stragglers.

use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{SourceError, panic_message};
use crate::event::Envelope;
use crate::signals::{Bus, Signal, SignalKind};
use crate::sources::SourceRef;

/// Forwards the events of one source into the shared queue.
pub(super) struct Pump {
    name: Arc<str>,
    source: SourceRef,
    queue: mpsc::UnboundedSender<Envelope>,
    bus: Bus,
}

impl Pump {
    pub(super) fn new(source: SourceRef, queue: mpsc::UnboundedSender<Envelope>, bus: Bus) -> Self {
        Self {
            name: Arc::from(source.name()),
            source,
            queue,
            bus,
        }
    }

    pub(super) fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Runs the pump until its source ends or `ctx` is cancelled.
    pub(super) async fn run(self, ctx: CancellationToken) -> Arc<str> {
        let name = Arc::clone(&self.name);
        let bus = self.bus.clone();

        if let Err(panic_err) = std::panic::AssertUnwindSafe(self.drain(ctx))
            .catch_unwind()
            .await
        {
            bus.publish(
                Signal::new(SignalKind::SourcePanicked)
                    .with_source(Arc::clone(&name))
                    .with_reason(panic_message(&*panic_err)),
            );
        }
        name
    }

    async fn drain(self, ctx: CancellationToken) {
        let Pump {
            name,
            source,
            queue,
            bus,
        } = self;

        bus.publish(Signal::new(SignalKind::SourceStarted).with_source(Arc::clone(&name)));
        let mut stream = source.open(ctx.clone());
        let mut forwarded: usize = 0;

        let reason = loop {
            let next = tokio::select! {
                biased;
                _ = ctx.cancelled() => break "cancelled",
                item = stream.next() => item,
            };

            match next {
                None => break "exhausted",
                Some(Ok(event)) => {
                    if queue.send(Envelope::new(Arc::clone(&name), event)).is_err() {
                        break "queue_closed";
                    }
                    forwarded += 1;
                }
                Some(Err(SourceError::Canceled)) => break "cancelled",
                Some(Err(e)) if e.is_terminal() => {
                    bus.publish(
                        Signal::new(SignalKind::SourceDead)
                            .with_source(Arc::clone(&name))
                            .with_reason(e.to_string())
                            .with_count(forwarded),
                    );
                    return;
                }
                Some(Err(e)) => {
                    bus.publish(
                        Signal::new(SignalKind::SourceFailed)
                            .with_source(Arc::clone(&name))
                            .with_reason(e.to_string()),
                    );
                }
            }
        };

        drop(stream);
        bus.publish(
            Signal::new(SignalKind::SourceEnded)
                .with_source(name)
                .with_reason(reason)
                .with_count(forwarded),
        );
    }
}
