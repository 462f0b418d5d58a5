//! Runtime signals: types and broadcast bus.
//!
//! Signals are the crate's only observability channel: components never log directly,
//! they publish a [`Signal`] and injected [`Subscribe`](crate::Subscribe) observers decide
//! what to do with it (see [`LogWriter`](crate::LogWriter) for the tracing bridge).
//!
//! ## Contents
//! - [`SignalKind`], [`Signal`] classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ProactiveManager`, pumps, dispatcher, `SubscriberSet` workers.
//! - **Consumers**: the signal listener spawned by the builder (fans out to
//!   `SubscriberSet`), plus any raw receiver from `ProactiveManager::subscribe_signals`.

mod bus;
mod signal;

pub use bus::Bus;
pub use signal::{Signal, SignalKind};
