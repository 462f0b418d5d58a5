//! # Function-backed source.
//!
//! [`StreamSource`] wraps any named stream, the way a closure task wraps a function.
//!
//! # Example
//! ```rust
//! use proactive::{Event, StreamSource};
//! use serde_json::json;
//!
//! let src = StreamSource::from_events("scripted", vec![
//!     Event::message(json!({ "text": "hello" })),
//! ]);
//! # let _ = src;
//! ```

use futures::{Stream, StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::event::Event;
use crate::sources::{EventSource, EventStream};

/// Named wrapper over an arbitrary event stream.
pub struct StreamSource {
    name: String,
    stream: EventStream,
}

impl StreamSource {
    /// Wraps an infallible stream of events.
    pub fn new<S>(name: impl Into<String>, events: S) -> Self
    where
        S: Stream<Item = Event> + Send + 'static,
    {
        Self::fallible(name, events.map(Ok))
    }

    /// Wraps a stream of production results.
    pub fn fallible<S>(name: impl Into<String>, results: S) -> Self
    where
        S: Stream<Item = Result<Event, SourceError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            stream: results.boxed(),
        }
    }

    /// Creates a finite source that yields the given events and ends.
    pub fn from_events(name: impl Into<String>, events: impl IntoIterator<Item = Event>) -> Self {
        let events: Vec<Event> = events.into_iter().collect();
        Self::new(name, stream::iter(events))
    }

    /// Boxes the source for registration.
    pub fn boxed(self) -> Box<dyn EventSource> {
        Box::new(self)
    }
}

impl EventSource for StreamSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(self: Box<Self>, _ctx: CancellationToken) -> EventStream {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn yields_events_then_ends() {
        let src = StreamSource::from_events(
            "scripted",
            vec![
                Event::message(json!("one")),
                Event::message(json!("two")),
            ],
        )
        .boxed();
        assert_eq!(src.name(), "scripted");

        let texts: Vec<String> = src
            .open(CancellationToken::new())
            .map(|r| r.unwrap().text("text").unwrap().to_string())
            .collect()
            .await;
        assert_eq!(texts, vec!["one", "two"]);
    }
}
