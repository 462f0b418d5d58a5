//! # ProactiveManager: fan-in of event sources, decision, delivery and shutdown.
//!
//! The [`ProactiveManager`] owns the delivery gate, the decision pipeline and the
//! signal bus. Each [`run`](ProactiveManager::run) spawns one pump per source, drains
//! the merged queue serially and tears everything down on [`stop`](ProactiveManager::stop).
//!
//! ## High-level architecture
//! ```text
//! run(sources):
//!   Idle ──► Running                          (one active run at most)
//!
//!   Source[0]  Source[1]  ...  Source[N-1]
//!       │          │                │
//!       └──► Pump (child token of the run token) ── JoinSet
//!                 │
//!                 ▼  Envelope { source, event }
//!          unbounded mpsc queue ──► consumer loop ──► Dispatcher::dispatch
//!                                                        gate → decide → compose → sink
//!
//! stop():
//!   Running ──► Stopping              (also entered when the consumer faults)
//!       └─► run token cancelled → consumer abandons the in-flight event
//!       └─► queue closed, leftover events dropped
//!       └─► wait for pumps up to cfg.grace
//!              ├─ all joined → Ok(())
//!              └─ timeout    → abort + join stragglers → GraceExceeded
//!   Stopping ──► Idle          (stop() returns here)
//! ```
//!
//! ## Rules
//! - `run` while not idle is a no-op (`AlreadyRunning` signal, `Ok(())`).
//! - `stop` is idempotent and may be called concurrently from many tasks.
//! - Every teardown passes through `Stopping`, including one caused by a consumer fault.
//! - Dropping the `run` future cancels every pump and resets the manager to idle.
//! - `enable`/`disable` only gate delivery; sources keep running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::{dispatch::Dispatcher, pump::Pump, shutdown};
use crate::error::{RuntimeError, panic_message};
use crate::event::Envelope;
use crate::signals::{Bus, Signal, SignalKind};
use crate::sources::SourceRef;

/// Lifecycle phase of the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Running,
    Stopping,
}

#[derive(Debug)]
pub(crate) struct RunState {
    phase: Phase,
    /// Root token of the active run.
    token: Option<CancellationToken>,
}

/// Resets the manager to idle when the run ends or its future is dropped.
struct IdleGuard<'a> {
    state: &'a watch::Sender<RunState>,
    token: CancellationToken,
}

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        self.token.cancel();
        self.state.send_modify(|st| {
            st.phase = Phase::Idle;
            st.token = None;
        });
    }
}

/// Proactive notification engine.
///
/// Create it with [`ProactiveManager::builder`].
pub struct ProactiveManager {
    cfg: Config,
    bus: Bus,
    enabled: Arc<AtomicBool>,
    state: watch::Sender<RunState>,
    dispatcher: Dispatcher,
    /// Stops the signal listener when the manager is dropped.
    listener: CancellationToken,
}

impl ProactiveManager {
    pub(super) fn new(cfg: Config, bus: Bus, dispatcher: Dispatcher, listener: CancellationToken) -> Self {
        let (state, _) = watch::channel(RunState {
            phase: Phase::Idle,
            token: None,
        });
        Self {
            enabled: Arc::clone(&dispatcher.enabled),
            cfg,
            bus,
            state,
            dispatcher,
            listener,
        }
    }

    /// Runs the given sources until [`stop`](Self::stop) is called or the consumer faults.
    ///
    /// Returns once every pump has terminated and the manager is idle again.
    ///
    /// # Errors
    /// - [`RuntimeError::GraceExceeded`] when sources had to be aborted after `cfg.grace`.
    /// - [`RuntimeError::ConsumerFault`] when the consumer loop itself panicked.
    pub async fn run(&self, sources: Vec<SourceRef>) -> Result<(), RuntimeError> {
        let token = CancellationToken::new();
        let started = self.state.send_if_modified(|st| {
            if st.phase != Phase::Idle {
                return false;
            }
            st.phase = Phase::Running;
            st.token = Some(token.clone());
            true
        });
        if !started {
            self.bus.publish(Signal::new(SignalKind::AlreadyRunning));
            return Ok(());
        }
        let guard = IdleGuard {
            state: &self.state,
            token: token.clone(),
        };

        self.bus
            .publish(Signal::new(SignalKind::ManagerStarted).with_count(sources.len()));

        let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
        let mut pumps = JoinSet::new();
        let mut alive: Vec<Arc<str>> = Vec::with_capacity(sources.len());
        for source in sources {
            let pump = Pump::new(source, tx.clone(), self.bus.clone());
            alive.push(Arc::clone(pump.name()));
            pumps.spawn(pump.run(token.child_token()));
        }
        drop(tx);

        let fault = self.consume(&mut rx, &token).await;

        self.begin_stopping();
        token.cancel();
        rx.close();
        let mut dropped: usize = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        let joined = self.join_pumps(&mut pumps, alive).await;

        self.bus
            .publish(Signal::new(SignalKind::ManagerStopped).with_count(dropped));
        drop(guard);

        match fault {
            Some(reason) => Err(RuntimeError::ConsumerFault { reason }),
            None => joined,
        }
    }

    /// Drains the queue until the run token fires; returns the fault reason if dispatch panicked.
    async fn consume(
        &self,
        rx: &mut mpsc::UnboundedReceiver<Envelope>,
        token: &CancellationToken,
    ) -> Option<String> {
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return None,
                env = rx.recv() => env,
            };
            let Some(env) = next else {
                // Every source ended; stay up until asked to stop.
                token.cancelled().await;
                return None;
            };

            let work = std::panic::AssertUnwindSafe(self.dispatcher.dispatch(env)).catch_unwind();
            tokio::select! {
                biased;
                _ = token.cancelled() => return None,
                res = work => {
                    if let Err(panic_err) = res {
                        let reason = panic_message(&*panic_err);
                        self.bus.publish(
                            Signal::new(SignalKind::ConsumerFaulted).with_reason(reason.clone()),
                        );
                        return Some(reason);
                    }
                }
            }
        }
    }

    /// Waits for every pump within the grace period, then aborts whatever is left.
    async fn join_pumps(
        &self,
        pumps: &mut JoinSet<Arc<str>>,
        mut alive: Vec<Arc<str>>,
    ) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let done = async {
            while let Some(res) = pumps.join_next().await {
                if let Ok(name) = res {
                    if let Some(pos) = alive.iter().position(|n| *n == name) {
                        alive.swap_remove(pos);
                    }
                }
            }
        };
        if tokio::time::timeout(grace, done).await.is_ok() {
            return Ok(());
        }

        pumps.abort_all();
        while pumps.join_next().await.is_some() {}

        let stuck: Vec<String> = alive.iter().map(|n| n.to_string()).collect();
        self.bus.publish(
            Signal::new(SignalKind::GraceExceeded)
                .with_duration(grace)
                .with_reason(stuck.join(", ")),
        );
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// Stops the active run and waits until it is fully torn down.
    ///
    /// No-op when idle. Concurrent callers all return once the manager is idle.
    pub async fn stop(&self) {
        self.stop_with(None).await;
    }

    async fn stop_with(&self, reason: Option<String>) {
        let mut rx = self.state.subscribe();
        if let Some(token) = self.begin_stopping() {
            let mut signal = Signal::new(SignalKind::StopRequested);
            if let Some(reason) = reason {
                signal = signal.with_reason(reason);
            }
            self.bus.publish(signal);
            token.cancel();
        }
        let _ = rx.wait_for(|st| st.phase == Phase::Idle).await;
    }

    /// Moves `Running` to `Stopping`; returns the run token if this call made the move.
    fn begin_stopping(&self) -> Option<CancellationToken> {
        let mut token = None;
        self.state.send_if_modified(|st| {
            if st.phase != Phase::Running {
                return false;
            }
            st.phase = Phase::Stopping;
            token = st.token.clone();
            true
        });
        token
    }

    /// Opens the delivery gate.
    pub fn enable(&self) {
        if !self.enabled.swap(true, Ordering::SeqCst) {
            self.bus.publish(Signal::new(SignalKind::DeliveryEnabled));
        }
    }

    /// Closes the delivery gate; events keep flowing and are discarded.
    pub fn disable(&self) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            self.bus.publish(Signal::new(SignalKind::DeliveryDisabled));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// `true` from a successful `run` start until its teardown completes.
    pub fn is_running(&self) -> bool {
        self.state.borrow().phase != Phase::Idle
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    ///
    /// Returns `None` (and publishes `EmptySources`) when `sources` is empty.
    pub fn start_detached(
        self: &Arc<Self>,
        sources: Vec<SourceRef>,
    ) -> Option<JoinHandle<Result<(), RuntimeError>>> {
        if sources.is_empty() {
            self.bus.publish(Signal::new(SignalKind::EmptySources));
            return None;
        }
        let this = Arc::clone(self);
        Some(tokio::spawn(async move { this.run(sources).await }))
    }

    /// Runs until the process receives a termination signal, then stops gracefully.
    pub async fn run_until_signal(&self, sources: Vec<SourceRef>) -> Result<(), RuntimeError> {
        let run = self.run(sources);
        tokio::pin!(run);

        let reason = tokio::select! {
            res = &mut run => return res,
            sig = shutdown::wait_for_shutdown_signal() => match sig {
                Ok(name) => format!("received {name}"),
                Err(e) => format!("signal listener failed: {e}"),
            },
        };
        let (res, ()) = tokio::join!(run, self.stop_with(Some(reason)));
        res
    }

    /// Returns a raw receiver of every signal published from now on.
    pub fn subscribe_signals(&self) -> broadcast::Receiver<Signal> {
        self.bus.subscribe()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}

impl Drop for ProactiveManager {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;

    #[tokio::test]
    async fn teardown_enters_stopping_once() {
        let mgr = ProactiveManager::builder(Arc::new(ChannelSink::default())).build();
        assert!(mgr.begin_stopping().is_none());

        let token = CancellationToken::new();
        mgr.state.send_modify(|st| {
            st.phase = Phase::Running;
            st.token = Some(token.clone());
        });
        let mut phases = mgr.state.subscribe();

        let taken = mgr.begin_stopping().expect("running manager yields its token");
        assert_eq!(phases.borrow_and_update().phase, Phase::Stopping);
        assert!(mgr.is_running());
        taken.cancel();
        assert!(token.is_cancelled());

        assert!(mgr.begin_stopping().is_none());
        assert!(!phases.has_changed().unwrap());
    }
}
