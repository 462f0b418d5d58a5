//! # proactive
//!
//! **Proactive** decides, in real time, whether something that happened outside a chat
//! is worth telling its users about, and if so delivers exactly one notification.
//!
//! It merges an open-ended set of asynchronous event sources into one stream, runs a
//! decision policy on every event (a keyword rule or an oracle-backed YES/NO judgment),
//! composes a short text and hands it to a single broadcast sink.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  TickSource  │   │  FeedSource  │   │MessageSource │   ... any EventSource
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Pump     │   │     Pump     │   │     Pump     │   (one task per source,
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘    child token each)
//!            └─────── Envelope{source, event} ─────┘
//!                               ▼
//!                 unbounded merge queue (arrival order)
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ProactiveManager consumer loop (serial)                          │
//! │   enabled? ──no──► discard                                        │
//! │   tick?    ──yes─► accept                                         │
//! │   Decide::decide (RuleStrategy | OracleStrategy | custom)         │
//! │   Composer::compose ──► BroadcastSink::broadcast                  │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ Signals (every step above)
//!                                ▼
//!                    Bus (broadcast channel) ──► listener ──► SubscriberSet
//!                                                      ┌─────────┼─────────┐
//!                                                      ▼         ▼         ▼
//!                                                  LogWriter  metrics   custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──run()──► Running ──stop()──► Stopping ──(all pumps joined)──► Idle
//!                    │
//!                    └─ consumer fault ──► Stopping (run returns ConsumerFault)
//! ```
//!
//! ## Features
//! | Area             | Description                                                  | Key types / traits                                  |
//! |------------------|--------------------------------------------------------------|-----------------------------------------------------|
//! | **Sources**      | Pluggable producers plus reference implementations.          | [`EventSource`], [`TickSource`], [`FeedSource`]     |
//! | **Decision**     | Notify/suppress judgment, fail closed.                       | [`Decide`], [`RuleStrategy`], [`OracleStrategy`]    |
//! | **Delivery**     | Text composition and fan-out to downstream consumers.        | [`Composer`], [`BroadcastSink`], [`ChannelSink`]    |
//! | **Manager**      | Fan-in, gating, graceful shutdown.                           | [`ProactiveManager`], [`ManagerBuilder`]            |
//! | **Observability**| Typed runtime signals and observer hooks.                    | [`Signal`], [`Subscribe`]                           |
//! | **Errors**       | Typed errors per failure class.                              | [`SourceError`], [`DecisionError`], [`RuntimeError`]|
//! | **Configuration**| Centralized settings with sentinel-aware accessors.          | [`Config`]                                          |
//!
//! ## Optional features
//! - `logging` _(default)_: exports [`LogWriter`], forwarding signals to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use proactive::{ChannelSink, Config, ProactiveManager, TickSource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = Arc::new(ChannelSink::default());
//!     let mut chat = sink.subscribe();
//!
//!     let mut cfg = Config::default();
//!     cfg.rule_text = "Time to stretch!".into();
//!
//!     let mgr = ProactiveManager::builder(sink).with_config(cfg).build();
//!     let handle = mgr
//!         .start_detached(vec![TickSource::new(Duration::from_millis(20)).boxed()])
//!         .expect("at least one source");
//!
//!     let first = chat.recv().await?;
//!     assert_eq!(first.text, "Time to stretch!");
//!
//!     mgr.stop().await;
//!     handle.await??;
//!     Ok(())
//! }
//! ```

mod compose;
mod config;
mod core;
mod error;
mod event;
mod notification;
mod oracle;
mod policies;
mod signals;
mod sink;
mod sources;
mod subscribers;

// ---- Public re-exports ----

pub use compose::Composer;
pub use config::{Config, DEFAULT_ORACLE_TIMEOUT, DEFAULT_RULE_TEXT};
pub use crate::core::{ManagerBuilder, ProactiveManager, wait_for_shutdown_signal};
pub use error::{DecisionError, OracleError, RuntimeError, SinkError, SourceError};
pub use event::{Category, Envelope, Event, FeedItem, Payload};
pub use notification::Notification;
pub use oracle::{FragmentStream, Oracle, PromptMessage, Role};
pub use policies::{DEFAULT_KEYWORDS, Decide, OracleStrategy, RuleStrategy, SYSTEM_PROMPT};
pub use signals::{Bus, Signal, SignalKind};
pub use sink::{BroadcastSink, ChannelSink, SinkFn};
pub use sources::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_SEEN_CAPACITY, EventSource, EventStream, FeedFetcher, FeedSource,
    HttpFeedFetcher, Jitter, MIN_POLL_INTERVAL, MessageSender, MessageSource, RetryBackoff,
    SeenSet, SourceRef, StreamSource, TickSource, next_boundary_delay, parse_feed,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in tracing observer.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
