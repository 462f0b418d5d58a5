//! # Events produced by sources.
//!
//! An [`Event`] is an immutable, categorized payload. The multiplexer never looks
//! inside the payload; only the decision policies and the composer do.
//!
//! ## Example
//! ```rust
//! use proactive::{Category, Event};
//! use serde_json::json;
//!
//! let ev = Event::message(json!({ "text": "A user just joined the chat!" }));
//! assert_eq!(ev.category(), &Category::Message);
//! assert_eq!(ev.text("text"), Some("A user just joined the chat!"));
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category-specific key/value data carried by an event.
pub type Payload = Map<String, Value>;

/// Event classification.
///
/// Serializes as a plain lowercase string (`"tick"`, `"feed"`, `"message"`, or the
/// custom name for [`Category::Other`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    /// Time-based event; always notified.
    Tick,
    /// New item observed in a polled feed.
    Feed,
    /// Free-form message pushed by the host.
    Message,
    /// Any other producer-defined category.
    Other(String),
}

impl Category {
    /// Returns the category name.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Tick => "tick",
            Category::Feed => "feed",
            Category::Message => "message",
            Category::Other(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "tick" => Category::Tick,
            "feed" => Category::Feed,
            "message" => Category::Message,
            _ => Category::Other(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::from(s.to_string())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item of a polled feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Stable identifier used for de-duplication.
    pub id: String,
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: String,
}

/// Immutable, categorized unit of information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    category: Category,
    payload: Payload,
}

impl Event {
    /// Creates an event of an arbitrary category.
    pub fn new(category: impl Into<Category>, payload: Payload) -> Self {
        Self {
            category: category.into(),
            payload,
        }
    }

    /// Creates a `tick` event stamped with `utc`.
    pub fn tick(utc: DateTime<Utc>) -> Self {
        let mut payload = Payload::new();
        payload.insert(
            "utc".into(),
            Value::String(utc.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        Self::new(Category::Tick, payload)
    }

    /// Creates a `feed` event from a feed item.
    pub fn feed(item: &FeedItem) -> Self {
        let mut payload = Payload::new();
        payload.insert("title".into(), Value::String(item.title.clone()));
        payload.insert("link".into(), Value::String(item.link.clone()));
        payload.insert("summary".into(), Value::String(item.summary.clone()));
        payload.insert("published".into(), Value::String(item.published.clone()));
        Self::new(Category::Feed, payload)
    }

    /// Creates a `message` event.
    ///
    /// Non-object values are stored under the `text` key (strings) or `value` key.
    pub fn message(payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            Value::String(text) => Payload::from_iter([("text".to_string(), Value::String(text))]),
            other => Payload::from_iter([("value".to_string(), other)]),
        };
        Self::new(Category::Message, payload)
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the payload field `key` if it is a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    #[inline]
    pub fn is_tick(&self) -> bool {
        matches!(self.category, Category::Tick)
    }
}

/// An event tagged with the name of the source that produced it.
///
/// This is the item type of the merge queue.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Name of the producing source.
    pub source: Arc<str>,
    pub event: Event,
}

impl Envelope {
    pub fn new(source: impl Into<Arc<str>>, event: Event) -> Self {
        Self {
            source: source.into(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn category_round_trips_through_plain_strings() {
        assert_eq!(Category::from("feed"), Category::Feed);
        assert_eq!(Category::from("weather"), Category::Other("weather".into()));
        assert_eq!(
            serde_json::to_value(Category::Other("weather".into())).unwrap(),
            json!("weather")
        );
        assert_eq!(serde_json::to_value(Category::Tick).unwrap(), json!("tick"));
    }

    #[test]
    fn tick_payload_carries_utc_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap();
        let ev = Event::tick(at);
        assert!(ev.is_tick());
        assert_eq!(ev.text("utc"), Some("2024-01-01T00:05:00Z"));
    }

    #[test]
    fn feed_payload_has_all_item_fields() {
        let item = FeedItem {
            id: "ep-10".into(),
            title: "New Episode 10 released!".into(),
            link: "https://example.com/episode10".into(),
            summary: "".into(),
            published: "Mon, 01 Jan 2024 00:00:00 GMT".into(),
        };
        let ev = Event::feed(&item);
        assert_eq!(ev.category(), &Category::Feed);
        assert_eq!(ev.text("title"), Some("New Episode 10 released!"));
        assert_eq!(ev.text("summary"), Some(""));
        assert!(ev.payload().get("id").is_none());
    }

    #[test]
    fn message_wraps_bare_strings() {
        let ev = Event::message(json!("hello"));
        assert_eq!(ev.text("text"), Some("hello"));

        let ev = Event::message(json!(42));
        assert_eq!(ev.payload().get("value"), Some(&json!(42)));
    }

    #[test]
    fn event_serializes_with_category_name() {
        let ev = Event::message(json!({ "text": "hi", "user": "demo_user" }));
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["category"], json!("message"));
        assert_eq!(v["payload"]["user"], json!("demo_user"));
    }
}
