//! # HTTP feed fetcher.
//!
//! [`HttpFeedFetcher`] downloads a feed with `reqwest` and parses it with
//! [`parse_feed`], which understands RSS 2.0 (`<item>`) and Atom (`<entry>`)
//! documents.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use crate::error::SourceError;
use crate::event::FeedItem;
use crate::sources::FeedFetcher;

/// Default bound on a single feed request, connection to last body byte.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches an RSS/Atom document over HTTP.
#[derive(Clone, Debug)]
pub struct HttpFeedFetcher {
    url: String,
    client: reqwest::Client,
    /// Per-request timeout; `None` defers to the client's own settings.
    timeout: Option<Duration>,
}

impl HttpFeedFetcher {
    /// Creates a fetcher whose requests give up after [`DEFAULT_HTTP_TIMEOUT`].
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            timeout: Some(DEFAULT_HTTP_TIMEOUT),
        }
    }

    /// Uses a preconfigured client (timeouts, proxy, user agent, ...).
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
            timeout: None,
        }
    }

    /// Bounds every request; a request that runs out of time is a failed poll.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_error(&self, error: impl ToString) -> SourceError {
        SourceError::Fetch {
            url: self.url.clone(),
            error: error.to_string(),
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self) -> Result<Vec<FeedItem>, SourceError> {
        let mut request = self.client.get(&self.url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let body = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.fetch_error(e))?
            .text()
            .await
            .map_err(|e| self.fetch_error(e))?;
        parse_feed(&body)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Link,
    Summary,
    Published,
    Updated,
}

impl Field {
    fn from_local(name: &[u8]) -> Option<Self> {
        match name {
            b"guid" | b"id" => Some(Field::Id),
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" | b"summary" => Some(Field::Summary),
            b"pubDate" | b"published" | b"date" => Some(Field::Published),
            b"updated" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Draft {
    item: FeedItem,
    updated: String,
}

impl Draft {
    fn push(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Id => &mut self.item.id,
            Field::Title => &mut self.item.title,
            Field::Link => &mut self.item.link,
            Field::Summary => &mut self.item.summary,
            Field::Published => &mut self.item.published,
            Field::Updated => &mut self.updated,
        };
        slot.push_str(text);
    }

    /// Atom links carry the target in `href`; only `alternate` links count.
    fn atom_link(&mut self, e: &BytesStart<'_>) {
        let rel = e
            .try_get_attribute("rel")
            .ok()
            .flatten()
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
        if !matches!(rel.as_deref(), None | Some("alternate")) || !self.item.link.is_empty() {
            return;
        }
        if let Some(href) = e
            .try_get_attribute("href")
            .ok()
            .flatten()
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
        {
            self.item.link = href;
        }
    }

    fn finish(self) -> FeedItem {
        let Draft { mut item, updated } = self;
        for s in [
            &mut item.id,
            &mut item.title,
            &mut item.link,
            &mut item.summary,
            &mut item.published,
        ] {
            *s = s.trim().to_string();
        }
        if item.published.is_empty() {
            item.published = updated.trim().to_string();
        }
        if item.id.is_empty() {
            item.id = if item.link.is_empty() {
                item.title.clone()
            } else {
                item.link.clone()
            };
        }
        item
    }
}

/// Parses an RSS 2.0 or Atom document into feed items (document order).
///
/// # Example
/// ```rust
/// use proactive::parse_feed;
///
/// let xml = r#"<rss version="2.0"><channel><title>Show</title>
///   <item><title>New Episode 10 released!</title><link>https://example.com/10</link></item>
/// </channel></rss>"#;
///
/// let items = parse_feed(xml).unwrap();
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].id, "https://example.com/10");
/// ```
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut draft: Option<Draft> = None;
    let mut field: Option<Field> = None;
    let mut is_feed = false;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(ref e)) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"rss" | b"feed" | b"RDF" | b"channel" => is_feed = true,
                    b"item" | b"entry" => {
                        draft = Some(Draft::default());
                        field = None;
                    }
                    name => {
                        if let Some(d) = draft.as_mut() {
                            if name == b"link" {
                                d.atom_link(e);
                            }
                            if field.is_none() {
                                field = Field::from_local(name);
                            }
                        }
                    }
                }
            }
            Ok(XmlEvent::Empty(ref e)) => {
                if let Some(d) = draft.as_mut() {
                    if e.local_name().as_ref() == b"link" {
                        d.atom_link(e);
                    }
                }
            }
            Ok(XmlEvent::End(ref e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    if let Some(d) = draft.take() {
                        items.push(d.finish());
                    }
                    field = None;
                }
                name => {
                    if field.is_some() && Field::from_local(name) == field {
                        field = None;
                    }
                }
            },
            Ok(XmlEvent::Text(ref e)) => {
                if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                    let text = e.unescape().map_err(|err| SourceError::Parse {
                        error: err.to_string(),
                    })?;
                    d.push(f, &text);
                }
            }
            Ok(XmlEvent::CData(ref e)) => {
                if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                    d.push(f, &String::from_utf8_lossy(e));
                }
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => {
                return Err(SourceError::Parse {
                    error: format!("at byte {}: {e}", reader.buffer_position()),
                });
            }
            _ => {}
        }
    }

    if !is_feed {
        return Err(SourceError::Parse {
            error: "not an RSS or Atom document".into(),
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn hanging_server_is_a_failed_poll() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and read, never answer.
        tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            while conn.read(&mut buf).await.is_ok_and(|n| n > 0) {}
        });

        let fetcher = HttpFeedFetcher::new(format!("http://{addr}/feed.xml"))
            .with_timeout(Duration::from_millis(100));
        let res = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch())
            .await
            .expect("request was not bounded");
        let err = res.unwrap_err();
        assert_eq!(err.as_label(), "source_fetch");
        assert!(!err.is_terminal());
    }

    #[test]
    fn default_fetcher_bounds_requests() {
        let fetcher = HttpFeedFetcher::new("https://example.com/feed.xml");
        assert_eq!(fetcher.timeout, Some(DEFAULT_HTTP_TIMEOUT));
        let custom = HttpFeedFetcher::with_client("https://example.com/feed.xml", reqwest::Client::new());
        assert_eq!(custom.timeout, None);
    }

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>My Show</title>
    <link>https://example.com</link>
    <item>
      <title>New Episode 10 released!</title>
      <link>https://example.com/ep10</link>
      <guid isPermaLink="false">ep-10</guid>
      <description><![CDATA[<p>Ten is <b>here</b></p>]]></description>
      <pubDate>Mon, 06 May 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Boring maintenance update &amp; fixes</title>
      <link>https://example.com/maint</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Release notes</title>
  <link href="https://example.org/"/>
  <entry>
    <title>v2.0 announced</title>
    <link rel="self" href="https://example.org/self/2"/>
    <link href="https://example.org/v2"/>
    <id>urn:uuid:1225c695</id>
    <updated>2024-05-01T18:30:02Z</updated>
    <summary>Big one.</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_items() {
        let items = parse_feed(RSS).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].id, "ep-10");
        assert_eq!(items[0].title, "New Episode 10 released!");
        assert_eq!(items[0].link, "https://example.com/ep10");
        assert_eq!(items[0].summary, "<p>Ten is <b>here</b></p>");
        assert_eq!(items[0].published, "Mon, 06 May 2024 10:00:00 GMT");

        assert_eq!(items[1].title, "Boring maintenance update & fixes");
        assert_eq!(items[1].id, "https://example.com/maint");
        assert_eq!(items[1].published, "");
    }

    #[test]
    fn parses_atom_entries() {
        let items = parse_feed(ATOM).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "urn:uuid:1225c695");
        assert_eq!(items[0].title, "v2.0 announced");
        assert_eq!(items[0].link, "https://example.org/v2");
        assert_eq!(items[0].summary, "Big one.");
        assert_eq!(items[0].published, "2024-05-01T18:30:02Z");
    }

    #[test]
    fn rejects_non_feed_documents() {
        let err = parse_feed("<html><body>hi</body></html>").unwrap_err();
        assert_eq!(err.as_label(), "source_parse");
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(parse_feed("<rss><channel><item></channel></rss>").is_err());
    }
}
