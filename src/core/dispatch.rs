//! # Dispatch: handle one queued event.
//!
//! ```text
//! EventReceived
//!   delivery disabled     → EventDiscarded
//!   tick                  → accept
//!   policy.decide()
//!       Ok(false)         → EventSuppressed
//!       Err(e) / panic    → DecisionFailed (fail closed)
//!   delivery disabled     → EventDiscarded (gate closed while deciding)
//!   compose → sink.broadcast()
//!       Ok                → NotificationDelivered
//!       Err(e) / panic    → DeliveryFailed
//! ```
//!
//! ## Rules
//! - Nothing raised by the policy or the sink escapes `dispatch`.
//! - The source is never affected by what happens here.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;

use crate::compose::Composer;
use crate::error::{DecisionError, SinkError, panic_message};
use crate::event::Envelope;
use crate::policies::Decide;
use crate::signals::{Bus, Signal, SignalKind};
use crate::sink::BroadcastSink;

/// Decision → composition → delivery pipeline shared by every run.
pub(super) struct Dispatcher {
    pub(super) policy: Arc<dyn Decide>,
    pub(super) composer: Composer,
    pub(super) sink: Arc<dyn BroadcastSink>,
    pub(super) enabled: Arc<AtomicBool>,
    pub(super) bus: Bus,
}

impl Dispatcher {
    pub(super) async fn dispatch(&self, env: Envelope) {
        self.bus.publish(self.signal(SignalKind::EventReceived, &env));

        if !self.is_enabled() {
            self.bus.publish(self.signal(SignalKind::EventDiscarded, &env));
            return;
        }
        if !env.event.is_tick() && !self.judge(&env).await {
            return;
        }
        if !self.is_enabled() {
            self.bus.publish(self.signal(SignalKind::EventDiscarded, &env));
            return;
        }

        let notification = self.composer.compose(&env);
        let delivered = std::panic::AssertUnwindSafe(self.sink.broadcast(&notification))
            .catch_unwind()
            .await
            .unwrap_or_else(|p| {
                Err(SinkError::Panicked {
                    info: panic_message(&*p),
                })
            });

        match delivered {
            Ok(()) => self.bus.publish(
                self.signal(SignalKind::NotificationDelivered, &env)
                    .with_reason(notification.text),
            ),
            Err(e) => self.bus.publish(
                self.signal(SignalKind::DeliveryFailed, &env)
                    .with_reason(format!("{}: {e}", self.sink.name())),
            ),
        }
    }

    /// Asks the policy; anything but a clean `Ok(true)` means "do not notify".
    async fn judge(&self, env: &Envelope) -> bool {
        let verdict = std::panic::AssertUnwindSafe(self.policy.decide(&env.event))
            .catch_unwind()
            .await
            .unwrap_or_else(|p| {
                Err(DecisionError::Panicked {
                    info: panic_message(&*p),
                })
            });

        match verdict {
            Ok(true) => true,
            Ok(false) => {
                self.bus.publish(self.signal(SignalKind::EventSuppressed, env));
                false
            }
            Err(e) => {
                self.bus.publish(
                    self.signal(SignalKind::DecisionFailed, env)
                        .with_reason(format!("{} [{}]: {e}", self.policy.name(), e.as_label())),
                );
                false
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn signal(&self, kind: SignalKind, env: &Envelope) -> Signal {
        Signal::new(kind)
            .with_source(Arc::clone(&env.source))
            .with_category(env.event.category().as_str())
    }
}
