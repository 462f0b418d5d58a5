//! # Message composer.
//!
//! Maps an accepted [`Envelope`] onto a [`Notification`]. Pure and infallible: every
//! category produces some text, unknown ones fall back to a generic phrase.
//!
//! | category  | text                                             |
//! |-----------|--------------------------------------------------|
//! | `tick`    | configured reminder text, unmodified             |
//! | `feed`    | `New update: {title}` + ` - {link}` if link set  |
//! | `message` | payload `text`, or `New message received`        |
//! | other     | `Something interesting happened!`                |

use crate::event::{Category, Envelope};
use crate::notification::Notification;

const UNKNOWN_TITLE: &str = "Unknown";
const MESSAGE_FALLBACK: &str = "New message received";
const GENERIC_FALLBACK: &str = "Something interesting happened!";

/// Builds notifications from accepted events.
#[derive(Debug, Clone)]
pub struct Composer {
    rule_text: String,
}

impl Composer {
    /// Creates a composer that uses `rule_text` for time-based notifications.
    pub fn new(rule_text: impl Into<String>) -> Self {
        Self {
            rule_text: rule_text.into(),
        }
    }

    pub fn rule_text(&self) -> &str {
        &self.rule_text
    }

    /// Composes the notification for `env`.
    pub fn compose(&self, env: &Envelope) -> Notification {
        let ev = &env.event;
        let detail = (!ev.is_tick()).then(|| ev.payload().clone());

        Notification {
            text: self.text_for(env),
            origin: ev.category().clone(),
            source: env.source.clone(),
            detail,
        }
    }

    fn text_for(&self, env: &Envelope) -> String {
        let ev = &env.event;
        match ev.category() {
            Category::Tick => self.rule_text.clone(),
            Category::Feed => {
                let title = ev.text("title").unwrap_or(UNKNOWN_TITLE);
                match ev.text("link").filter(|l| !l.is_empty()) {
                    Some(link) => format!("New update: {title} - {link}"),
                    None => format!("New update: {title}"),
                }
            }
            Category::Message => ev.text("text").unwrap_or(MESSAGE_FALLBACK).to_string(),
            Category::Other(_) => GENERIC_FALLBACK.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, Payload};
    use chrono::Utc;
    use serde_json::json;

    fn env(ev: Event) -> Envelope {
        Envelope::new("test", ev)
    }

    #[test]
    fn tick_uses_rule_text_without_detail() {
        let c = Composer::new("Stretch your legs!");
        let n = c.compose(&env(Event::tick(Utc::now())));
        assert_eq!(n.text, "Stretch your legs!");
        assert_eq!(n.origin, Category::Tick);
        assert!(n.detail.is_none());
        assert!(n.is_time_based());
    }

    #[test]
    fn feed_with_and_without_link() {
        let c = Composer::new("r");
        let ev = Event::new(
            Category::Feed,
            json!({ "title": "Game update 2.0 announced", "link": "https://example.com/update" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let n = c.compose(&env(ev));
        assert_eq!(
            n.text,
            "New update: Game update 2.0 announced - https://example.com/update"
        );
        assert_eq!(n.detail.unwrap()["link"], json!("https://example.com/update"));

        let ev = Event::new(
            Category::Feed,
            json!({ "title": "Daily weather report", "link": "" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(c.compose(&env(ev)).text, "New update: Daily weather report");
    }

    #[test]
    fn feed_without_title_says_unknown() {
        let c = Composer::new("r");
        let n = c.compose(&env(Event::new(Category::Feed, Payload::new())));
        assert_eq!(n.text, "New update: Unknown");
    }

    #[test]
    fn message_text_or_fallback() {
        let c = Composer::new("r");
        let n = c.compose(&env(Event::message(json!({ "text": "System performance alert detected" }))));
        assert_eq!(n.text, "System performance alert detected");

        let n = c.compose(&env(Event::message(json!({ "severity": "warning" }))));
        assert_eq!(n.text, "New message received");
    }

    #[test]
    fn unknown_category_falls_back() {
        let c = Composer::new("r");
        let n = c.compose(&env(Event::new("weather", Payload::new())));
        assert_eq!(n.text, "Something interesting happened!");
        assert_eq!(n.origin, Category::Other("weather".into()));
        assert_eq!(&*n.source, "test");
    }
}
