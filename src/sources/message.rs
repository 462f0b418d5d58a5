//! # In-process message queue source.
//!
//! [`MessageSource::channel`] returns a sending handle and the source. Every
//! payload sent through the handle becomes one `message` event. The source ends
//! once every [`MessageSender`] clone has been dropped.
//!
//! # Example
//! ```rust
//! use proactive::MessageSource;
//! use serde_json::json;
//!
//! let (tx, source) = MessageSource::channel("chat");
//! tx.send(json!({ "text": "A user just joined the chat!" })).unwrap();
//! # let _ = source;
//! ```

use futures::{StreamExt, stream};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::event::Event;
use crate::sources::{EventSource, EventStream};

/// Handle used by the host to push messages into a [`MessageSource`].
#[derive(Clone, Debug)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<Value>,
}

impl MessageSender {
    /// Queues a message payload.
    ///
    /// Fails with [`SourceError::Canceled`] once the source has stopped.
    pub fn send(&self, payload: Value) -> Result<(), SourceError> {
        self.tx.send(payload).map_err(|_| SourceError::Canceled)
    }

    /// Queues a plain text message (`{"text": ...}`).
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), SourceError> {
        self.send(Value::String(text.into()))
    }

    /// Returns `true` once the source has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Source fed by [`MessageSender`] handles.
pub struct MessageSource {
    name: String,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl MessageSource {
    /// Creates a connected sender/source pair.
    pub fn channel(name: impl Into<String>) -> (MessageSender, MessageSource) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            MessageSender { tx },
            MessageSource {
                name: name.into(),
                rx,
            },
        )
    }

    /// Boxes the source for registration.
    pub fn boxed(self) -> Box<dyn EventSource> {
        Box::new(self)
    }
}

impl EventSource for MessageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(self: Box<Self>, _ctx: CancellationToken) -> EventStream {
        stream::unfold(self.rx, |mut rx| async move {
            let payload = rx.recv().await?;
            Some((Ok(Event::message(payload)), rx))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Category;
    use serde_json::json;

    #[tokio::test]
    async fn sent_payloads_become_message_events() {
        let (tx, source) = MessageSource::channel("chat");
        tx.send(json!({ "text": "hi", "user": "ana" })).unwrap();
        tx.send_text("plain").unwrap();
        drop(tx);

        let events: Vec<Event> = source
            .boxed()
            .open(CancellationToken::new())
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].category(), &Category::Message);
        assert_eq!(events[0].text("user"), Some("ana"));
        assert_eq!(events[1].text("text"), Some("plain"));
    }

    #[tokio::test]
    async fn send_fails_once_the_source_is_gone() {
        let (tx, source) = MessageSource::channel("chat");
        drop(source);
        assert!(tx.is_closed());
        assert!(matches!(tx.send_text("late"), Err(SourceError::Canceled)));
    }
}
