//! # Polled feed source.
//!
//! [`FeedSource`] asks a [`FeedFetcher`] for the current items every poll interval
//! and emits a `feed` event for each item it has not seen before. The first poll
//! happens immediately on open.
//!
//! ```text
//! loop:
//!   fetch() ── Ok(items) ──► unseen items ──► yield Ok(Event::feed)
//!     │                                         sleep(poll_interval)
//!     └───── Err(e) ──► yield Err(e) ──► Fatal? end
//!                                        sleep(retry.next(failures) or poll_interval)
//! ```
//!
//! Seen ids are held in a [`SeenSet`] bounded by `seen_capacity` (oldest evicted first).

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::event::{Event, FeedItem};
use crate::sources::{EventSource, EventStream, HttpFeedFetcher, RetryBackoff};

/// Default number of item ids remembered per feed source.
pub const DEFAULT_SEEN_CAPACITY: usize = 4096;

/// Shortest wait between two polls of the same feed.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Retrieves the current items of a feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync + 'static {
    /// Fetches and parses the feed once.
    async fn fetch(&self) -> Result<Vec<FeedItem>, SourceError>;
}

/// Insertion-ordered set of item ids with optional FIFO eviction.
#[derive(Debug, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenSet {
    /// Creates a set holding at most `capacity` ids (`0` = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Records `id`; returns `true` if it was not already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string());
        self.order.push_back(id.to_string());

        if self.capacity > 0 {
            while self.order.len() > self.capacity {
                if let Some(old) = self.order.pop_front() {
                    self.ids.remove(&old);
                }
            }
        }
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Polling source over a [`FeedFetcher`].
pub struct FeedSource {
    name: String,
    fetcher: Arc<dyn FeedFetcher>,
    poll_interval: Duration,
    seen_capacity: usize,
    retry: Option<RetryBackoff>,
}

impl FeedSource {
    /// Creates a feed source polling `fetcher` every `poll_interval`.
    ///
    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn new(
        name: impl Into<String>,
        fetcher: impl FeedFetcher,
        poll_interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            fetcher: Arc::new(fetcher),
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            seen_capacity: DEFAULT_SEEN_CAPACITY,
            retry: None,
        }
    }

    /// Creates a source polling an RSS/Atom URL over HTTP, named `rss:<url>`.
    pub fn http(url: impl Into<String>, poll_interval: Duration) -> Self {
        let url = url.into();
        Self::new(format!("rss:{url}"), HttpFeedFetcher::new(url), poll_interval)
    }

    /// Bounds the remembered ids (`0` = unbounded).
    pub fn with_seen_capacity(mut self, capacity: usize) -> Self {
        self.seen_capacity = capacity;
        self
    }

    /// Retries failed polls with backoff instead of waiting a full poll interval.
    pub fn with_retry_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.retry = Some(backoff);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Boxes the source for registration.
    pub fn boxed(self) -> Box<dyn EventSource> {
        Box::new(self)
    }
}

fn dedup_key(item: &FeedItem) -> &str {
    [&item.id, &item.link, &item.title]
        .into_iter()
        .find(|s| !s.is_empty())
        .map_or("", |s| s.as_str())
}

impl EventSource for FeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(self: Box<Self>, ctx: CancellationToken) -> EventStream {
        let FeedSource {
            fetcher,
            poll_interval,
            seen_capacity,
            retry,
            ..
        } = *self;

        let stream = async_stream::stream! {
            let mut seen = SeenSet::new(seen_capacity);
            let mut failures: u32 = 0;

            loop {
                let fetched = tokio::select! {
                    _ = ctx.cancelled() => break,
                    res = fetcher.fetch() => res,
                };

                let wait = match fetched {
                    Ok(items) => {
                        failures = 0;
                        for item in items {
                            if seen.insert(dedup_key(&item)) {
                                yield Ok(Event::feed(&item));
                            }
                        }
                        poll_interval
                    }
                    Err(e) => {
                        let terminal = e.is_terminal();
                        yield Err(e);
                        if terminal {
                            break;
                        }
                        let wait = retry.map_or(poll_interval, |b| b.next(failures));
                        failures = failures.saturating_add(1);
                        wait.max(MIN_POLL_INTERVAL)
                    }
                };

                tokio::select! {
                    _ = ctx.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
            }
        };
        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::Jitter;
    use futures::StreamExt;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Returns scripted poll results in order, then empty feeds.
    struct Scripted(Mutex<VecDeque<Result<Vec<FeedItem>, SourceError>>>);

    impl Scripted {
        fn new(polls: Vec<Result<Vec<FeedItem>, SourceError>>) -> Self {
            Self(Mutex::new(polls.into()))
        }
    }

    #[async_trait]
    impl FeedFetcher for Scripted {
        async fn fetch(&self) -> Result<Vec<FeedItem>, SourceError> {
            self.0.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    fn item(id: &str, title: &str) -> FeedItem {
        FeedItem {
            id: id.into(),
            title: title.into(),
            link: format!("https://example.com/{id}"),
            ..FeedItem::default()
        }
    }

    fn fetch_err() -> SourceError {
        SourceError::Fetch {
            url: "https://example.com/feed".into(),
            error: "503".into(),
        }
    }

    #[test]
    fn seen_set_evicts_oldest_first() {
        let mut seen = SeenSet::new(2);
        assert!(seen.insert("a"));
        assert!(seen.insert("b"));
        assert!(!seen.insert("a"));
        assert!(seen.insert("c"));
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains("a"));
        assert!(seen.insert("a"));
    }

    #[test]
    fn zero_capacity_is_unbounded() {
        let mut seen = SeenSet::new(0);
        for i in 0..10_000 {
            seen.insert(&i.to_string());
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn dedup_key_falls_back_to_link_then_title() {
        let mut it = FeedItem {
            title: "Only title".into(),
            ..FeedItem::default()
        };
        assert_eq!(dedup_key(&it), "Only title");
        it.link = "https://x".into();
        assert_eq!(dedup_key(&it), "https://x");
        it.id = "guid-1".into();
        assert_eq!(dedup_key(&it), "guid-1");
    }

    #[tokio::test(start_paused = true)]
    async fn emits_only_unseen_items_across_polls() {
        let fetcher = Scripted::new(vec![
            Ok(vec![item("1", "New Episode 10"), item("2", "Patch notes")]),
            Ok(vec![item("1", "New Episode 10"), item("3", "New Episode 11")]),
        ]);
        let mut s = FeedSource::new("rss", fetcher, Duration::from_secs(120))
            .boxed()
            .open(CancellationToken::new());

        let titles: Vec<String> = s
            .by_ref()
            .take(3)
            .map(|r| r.unwrap().text("title").unwrap().to_string())
            .collect()
            .await;
        assert_eq!(titles, vec!["New Episode 10", "Patch notes", "New Episode 11"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_is_reported_and_polling_continues() {
        let fetcher = Scripted::new(vec![Err(fetch_err()), Ok(vec![item("1", "Back")])]);
        let mut s = FeedSource::new("rss", fetcher, Duration::from_secs(120))
            .boxed()
            .open(CancellationToken::new());

        assert!(matches!(s.next().await, Some(Err(SourceError::Fetch { .. }))));
        let start = Instant::now();
        let ev = s.next().await.unwrap().unwrap();
        assert_eq!(ev.text("title"), Some("Back"));
        assert_eq!(start.elapsed(), Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_poll_interval_is_raised_to_the_minimum() {
        let fetcher = Scripted::new(vec![
            Ok(vec![item("1", "First")]),
            Err(fetch_err()),
            Ok(vec![item("2", "Second")]),
        ]);
        let src = FeedSource::new("rss", fetcher, Duration::ZERO).with_retry_backoff(RetryBackoff {
            first: Duration::ZERO,
            max: Duration::ZERO,
            factor: 2.0,
            jitter: Jitter::None,
        });
        assert_eq!(src.poll_interval(), MIN_POLL_INTERVAL);
        let mut s = src.boxed().open(CancellationToken::new());

        let start = Instant::now();
        assert!(s.next().await.unwrap().is_ok());
        assert!(s.next().await.unwrap().is_err());
        assert_eq!(start.elapsed(), MIN_POLL_INTERVAL);
        assert!(s.next().await.unwrap().is_ok());
        assert_eq!(start.elapsed(), MIN_POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_backoff_shortens_the_wait_after_failures() {
        let fetcher = Scripted::new(vec![
            Err(fetch_err()),
            Err(fetch_err()),
            Ok(vec![item("1", "Recovered")]),
        ]);
        let backoff = RetryBackoff {
            first: Duration::from_secs(1),
            max: Duration::from_secs(60),
            factor: 2.0,
            jitter: Jitter::None,
        };
        let mut s = FeedSource::new("rss", fetcher, Duration::from_secs(600))
            .with_retry_backoff(backoff)
            .boxed()
            .open(CancellationToken::new());

        let start = Instant::now();
        assert!(s.next().await.unwrap().is_err());
        assert!(s.next().await.unwrap().is_err());
        assert!(s.next().await.unwrap().is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_ends_the_stream() {
        let fetcher = Scripted::new(vec![Err(SourceError::Fatal {
            error: "bad url".into(),
        })]);
        let mut s = FeedSource::new("rss", fetcher, Duration::from_secs(1))
            .boxed()
            .open(CancellationToken::new());

        assert!(matches!(s.next().await, Some(Err(SourceError::Fatal { .. }))));
        assert!(s.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_poll_sleep() {
        let ctx = CancellationToken::new();
        let fetcher = Scripted::new(vec![Ok(vec![item("1", "First")])]);
        let mut s = FeedSource::new("rss", fetcher, Duration::from_secs(3600))
            .boxed()
            .open(ctx.clone());

        assert!(s.next().await.unwrap().is_ok());
        ctx.cancel();
        assert!(s.next().await.is_none());
    }
}
