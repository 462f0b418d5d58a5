//! # Non-blocking signal fan-out to multiple subscribers.
//!
//! ```text
//! emit(signal)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_signal()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     └──► [queue N] ──► worker N ──► subscriberN.on_signal()
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`).
//! - **Overflow**: signal dropped for that subscriber only, `SubscriberOverflow` published.
//! - **Per-subscriber FIFO**, no ordering across subscribers.
//! - **Isolation**: a slow or panicking subscriber doesn't affect the others.
//! - **No panic loops**: a subscriber never sees its own `SubscriberPanicked`, and a
//!   panic while handling a `SubscriberPanicked` signal is not re-published.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_message;
use crate::signals::{Bus, Signal, SignalKind};
use crate::subscribers::Subscribe;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Signal>>,
}

/// Fan-out coordinator for signal subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Signal>>(sub.queue_capacity().max(1));
            let worker_bus = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(s) = rx.recv().await {
                    let is_panic_report = matches!(s.kind, SignalKind::SubscriberPanicked);
                    if is_panic_report && s.source.as_deref() == Some(name) {
                        continue;
                    }
                    let fut = sub.on_signal(s.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        if !is_panic_report {
                            worker_bus
                                .publish(Signal::subscriber_panicked(name, panic_message(&*panic_err)));
                        }
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits a signal to all subscribers.
    ///
    /// Overflow signals that overflow themselves are not re-published (no feedback loop).
    pub fn emit(&self, signal: Arc<Signal>) {
        let is_overflow = matches!(signal.kind, SignalKind::SubscriberOverflow);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&signal)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow {
                self.bus
                    .publish(Signal::subscriber_overflow(channel.name, reason));
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Closes all queues and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<SignalKind>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_signal(&self, s: &Signal) {
            self.0.lock().unwrap().push(s.kind);
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Explode;

    #[async_trait]
    impl Subscribe for Explode {
        async fn on_signal(&self, _s: &Signal) {
            panic!("observer bug");
        }
        fn name(&self) -> &'static str {
            "explode"
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_drains_on_shutdown() {
        let bus = Bus::new(16);
        let collect = Arc::new(Collect::default());
        let set = SubscriberSet::new(vec![collect.clone() as Arc<dyn Subscribe>], bus);
        assert_eq!(set.len(), 1);

        set.emit(Arc::new(Signal::new(SignalKind::ManagerStarted)));
        set.emit(Arc::new(Signal::new(SignalKind::ManagerStopped)));
        set.shutdown().await;

        assert_eq!(
            *collect.0.lock().unwrap(),
            vec![SignalKind::ManagerStarted, SignalKind::ManagerStopped]
        );
    }

    struct AlwaysPanics {
        name: &'static str,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl AlwaysPanics {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: Default::default(),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Subscribe for AlwaysPanics {
        async fn on_signal(&self, _s: &Signal) {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            panic!("{} is broken", self.name);
        }
        fn name(&self) -> &'static str {
            self.name
        }
    }

    #[tokio::test]
    async fn panic_reports_do_not_feed_back_into_subscribers() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let a = AlwaysPanics::new("a");
        let b = AlwaysPanics::new("b");
        let set = SubscriberSet::new(vec![a.clone() as Arc<dyn Subscribe>, b.clone() as Arc<dyn Subscribe>], bus);

        // Forward bus traffic back into the set, as the manager's listener does.
        set.emit(Arc::new(Signal::new(SignalKind::DeliveryDisabled)));
        let mut reports = 0;
        while let Ok(Ok(s)) =
            tokio::time::timeout(std::time::Duration::from_millis(100), rx.recv()).await
        {
            assert_eq!(s.kind, SignalKind::SubscriberPanicked);
            reports += 1;
            set.emit(Arc::new(s));
        }
        set.shutdown().await;

        assert_eq!(reports, 2);
        // One original signal plus the other subscriber's report.
        assert_eq!(a.calls(), 2);
        assert_eq!(b.calls(), 2);
    }

    #[tokio::test]
    async fn panics_are_reported_on_the_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Explode)], bus);

        set.emit(Arc::new(Signal::new(SignalKind::EventReceived)));
        let s = rx.recv().await.unwrap();
        assert_eq!(s.kind, SignalKind::SubscriberPanicked);
        assert_eq!(s.source.as_deref(), Some("explode"));
        assert_eq!(s.reason.as_deref(), Some("observer bug"));
        set.shutdown().await;
    }
}
