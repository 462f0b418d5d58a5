//! # Event sources.
//!
//! An [`EventSource`] is a named, consumable producer of [`Event`](crate::Event)s.
//! The manager opens each registered source exactly once and drains the resulting
//! [`EventStream`] in a dedicated pump task until the stream ends, yields a fatal
//! error, or the run is cancelled.
//!
//! ```text
//!   EventSource ── open(ctx) ──► EventStream ──► pump ──► merge queue ──► consumer
//!        (consumed, not restartable)   Ok(Event)     forward
//!                                      Err(e)        report; Fatal ends the pump
//! ```
//!
//! ## Reference producers
//! - [`TickSource`]: epoch-aligned wall-clock ticks
//! - [`FeedSource`]: polls a [`FeedFetcher`] and emits only unseen items
//! - [`MessageSource`]: in-process queue fed through a [`MessageSender`]
//! - [`StreamSource`]: wraps any `Stream<Item = Event>`

mod feed;
mod http;
mod message;
mod retry;
mod stream;
mod tick;

use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::event::Event;

pub use feed::{DEFAULT_SEEN_CAPACITY, FeedFetcher, FeedSource, MIN_POLL_INTERVAL, SeenSet};
pub use http::{DEFAULT_HTTP_TIMEOUT, HttpFeedFetcher, parse_feed};
pub use message::{MessageSender, MessageSource};
pub use retry::{Jitter, RetryBackoff};
pub use stream::StreamSource;
pub use tick::{TickSource, next_boundary_delay};

/// Sequence of production results yielded by an opened source.
pub type EventStream = BoxStream<'static, Result<Event, SourceError>>;

/// Boxed source handed to the manager.
pub type SourceRef = Box<dyn EventSource>;

/// Producer of events.
///
/// ### Rules
/// - `open` consumes the source: a source runs at most once.
/// - The stream may stay pending forever; the pump drops it when `ctx` is cancelled.
/// - `Err` items are single failed productions unless
///   [`SourceError::is_terminal`] says otherwise.
pub trait EventSource: Send + 'static {
    /// Stable name used in signals and notifications.
    fn name(&self) -> &str;

    /// Starts producing. `ctx` is cancelled when the manager stops.
    fn open(self: Box<Self>, ctx: CancellationToken) -> EventStream;
}
