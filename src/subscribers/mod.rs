//! # Signal subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//!   Manager / pumps ── publish(Signal) ──► Bus ──► signal listener
//!                                                      │
//!                                                      ▼
//!                                               SubscriberSet::emit
//!                                                      │
//!                                     ┌────────────────┼──────────────┐
//!                                     ▼                ▼              ▼
//!                                 LogWriter         Metrics        Custom
//! ```
//!
//! Subscribers never block the publisher: each has its own bounded queue and worker.
//! [`LogWriter`] requires the `logging` feature (on by default).

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
