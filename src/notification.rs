//! # Outbound notifications.
//!
//! A [`Notification`] is built by the [`Composer`](crate::Composer) for an accepted event,
//! handed to the [`BroadcastSink`](crate::BroadcastSink) and then dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::event::{Category, Payload};

/// User-facing message derived from an accepted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Human-readable body.
    pub text: String,
    /// Category of the triggering event.
    pub origin: Category,
    /// Name of the source that produced the triggering event.
    pub source: Arc<str>,
    /// Echo of the triggering event's payload for downstream formatting.
    ///
    /// `None` for ticks: the reminder text is all there is to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Payload>,
}

impl Notification {
    #[inline]
    pub fn is_time_based(&self) -> bool {
        matches!(self.origin, Category::Tick)
    }
}
