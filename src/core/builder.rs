use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::{dispatch::Dispatcher, manager::ProactiveManager};
use crate::{
    compose::Composer,
    config::Config,
    oracle::Oracle,
    policies::{Decide, OracleStrategy, RuleStrategy},
    signals::Bus,
    sink::BroadcastSink,
    subscribers::{Subscribe, SubscriberSet},
};

impl ProactiveManager {
    /// Starts building a manager that delivers through `sink`.
    pub fn builder(sink: Arc<dyn BroadcastSink>) -> ManagerBuilder {
        ManagerBuilder::new(sink)
    }
}

/// Builder for [`ProactiveManager`].
///
/// Policy selection at [`build`](Self::build):
/// 1. a policy set with [`with_policy`](Self::with_policy);
/// 2. otherwise [`OracleStrategy`] if an oracle was set;
/// 3. otherwise [`RuleStrategy`] over `cfg.keywords`.
pub struct ManagerBuilder {
    cfg: Config,
    sink: Arc<dyn BroadcastSink>,
    oracle: Option<Arc<dyn Oracle>>,
    policy: Option<Arc<dyn Decide>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ManagerBuilder {
    pub fn new(sink: Arc<dyn BroadcastSink>) -> Self {
        Self {
            cfg: Config::default(),
            sink,
            oracle: None,
            policy: None,
            subscribers: Vec::new(),
        }
    }

    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Routes non-tick events through an oracle judgment.
    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Replaces the built-in policy selection.
    pub fn with_policy(mut self, policy: Arc<dyn Decide>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets signal observers.
    ///
    /// Each observer gets a dedicated worker with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one signal observer.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the manager.
    ///
    /// Must be called within a tokio runtime when observers are configured: their
    /// workers and the signal listener are spawned here.
    pub fn build(self) -> Arc<ProactiveManager> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();
        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            spawn_listener(&bus, subs, listener.clone());
        }

        let policy: Arc<dyn Decide> = match (self.policy, self.oracle) {
            (Some(policy), _) => policy,
            (None, Some(oracle)) => Arc::new(OracleStrategy::new(oracle, self.cfg.oracle_timeout())),
            (None, None) => Arc::new(RuleStrategy::new(&self.cfg.keywords)),
        };

        let dispatcher = Dispatcher {
            policy,
            composer: Composer::new(self.cfg.rule_text.clone()),
            sink: self.sink,
            enabled: Arc::new(AtomicBool::new(self.cfg.enabled)),
            bus: bus.clone(),
        };
        Arc::new(ProactiveManager::new(self.cfg, bus, dispatcher, listener))
    }
}

/// Forwards bus signals to the subscriber set until the manager is dropped.
fn spawn_listener(bus: &Bus, subs: SubscriberSet, stop: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                _ = stop.cancelled() => break,
                s = rx.recv() => s,
            };
            match next {
                Ok(signal) => subs.emit(Arc::new(signal)),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        subs.shutdown().await;
    });
}
