//! # Keyword rule strategy.
//!
//! [`RuleStrategy`] is the deterministic policy used when no oracle is configured.
//!
//! - `feed` → notify iff the title contains any keyword (case-insensitive substring);
//! - `tick` → always notify;
//! - anything else → suppress (no rule defined).

use async_trait::async_trait;

use crate::error::DecisionError;
use crate::event::{Category, Event};
use crate::policies::Decide;

/// Keywords matched against feed titles by default.
pub const DEFAULT_KEYWORDS: &[&str] = &["new", "episode", "release", "announced"];

/// Deterministic keyword policy.
#[derive(Debug, Clone)]
pub struct RuleStrategy {
    /// Lowercased keywords.
    keywords: Vec<String>,
}

impl RuleStrategy {
    /// Creates a rule over `keywords` (matched case-insensitively; blanks are ignored).
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Pure evaluation of the rule.
    pub fn matches(&self, event: &Event) -> bool {
        match event.category() {
            Category::Tick => true,
            Category::Feed => {
                let title = event.text("title").unwrap_or_default().to_lowercase();
                self.keywords.iter().any(|k| title.contains(k.as_str()))
            }
            Category::Message | Category::Other(_) => false,
        }
    }
}

impl Default for RuleStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

#[async_trait]
impl Decide for RuleStrategy {
    async fn decide(&self, event: &Event) -> Result<bool, DecisionError> {
        Ok(self.matches(event))
    }

    fn name(&self) -> &'static str {
        "rule"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{FeedItem, Payload};
    use chrono::Utc;
    use serde_json::json;

    fn feed(title: &str) -> Event {
        Event::feed(&FeedItem {
            id: title.into(),
            title: title.into(),
            ..FeedItem::default()
        })
    }

    #[test]
    fn keyword_titles_are_notified() {
        let rule = RuleStrategy::default();
        assert!(rule.matches(&feed("New Episode 10 released!")));
        assert!(rule.matches(&feed("New update available")));
        assert!(rule.matches(&feed("Sequel ANNOUNCED today")));
    }

    #[test]
    fn other_titles_are_suppressed() {
        let rule = RuleStrategy::default();
        assert!(!rule.matches(&feed("Boring maintenance update")));
        assert!(!rule.matches(&feed("Daily weather report")));
        assert!(!rule.matches(&Event::new(Category::Feed, Payload::new())));
    }

    #[test]
    fn only_feeds_and_ticks_have_rules() {
        let rule = RuleStrategy::default();
        assert!(rule.matches(&Event::tick(Utc::now())));
        assert!(!rule.matches(&Event::message(json!({ "text": "new release!" }))));
        assert!(!rule.matches(&Event::new("custom", Payload::new())));
    }

    #[test]
    fn custom_keywords_are_normalized() {
        let rule = RuleStrategy::new(["  Outage ", "", "PATCH"]);
        assert_eq!(rule.keywords(), ["outage", "patch"]);
        assert!(rule.matches(&feed("Emergency patch shipped")));
        assert!(!rule.matches(&feed("New Episode 10 released!")));
    }

    #[tokio::test]
    async fn decide_never_errors() {
        let rule = RuleStrategy::default();
        assert!(rule.decide(&feed("Release notes")).await.unwrap());
        assert!(!rule.decide(&feed("nothing here")).await.unwrap());
    }
}
