//! Proactive chat demo.
//!
//! Runs three sources against a console sink until Ctrl-C:
//! - a tick every 15 seconds (reminder text);
//! - a simulated feed publishing one item every 3 seconds;
//! - two custom chat messages.
//!
//! Feed items and messages are judged by a keyword-based demo oracle.
//!
//! ```text
//! RUST_LOG=proactive=debug cargo run --example proactive_chat
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use proactive::{
    Config, Event, FeedItem, FragmentStream, LogWriter, Notification, Oracle, OracleError,
    ProactiveManager, PromptMessage, SinkError, SinkFn, StreamSource, TickSource,
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Says YES when the event mentions one of a few interesting words.
struct DemoOracle;

#[async_trait]
impl Oracle for DemoOracle {
    async fn complete(&self, messages: Vec<PromptMessage>) -> Result<FragmentStream, OracleError> {
        let content = messages
            .last()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();
        let interesting = ["new", "release", "update", "announced", "joined"]
            .iter()
            .any(|k| content.contains(k));
        let answer = if interesting { "YES" } else { "NO" };
        Ok(stream::iter([Ok(answer.to_string())]).boxed())
    }

    fn name(&self) -> &str {
        "demo"
    }
}

fn demo_feed() -> StreamSource {
    let entries = [
        ("New anime episode released!", "https://example.com/ep1"),
        ("Server maintenance scheduled", "https://example.com/maintenance"),
        ("Game update 2.0 announced", "https://example.com/update"),
        ("Daily weather report", "https://example.com/weather"),
    ];
    let items = stream::iter(entries.into_iter().enumerate()).then(|(i, (title, link))| async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Event::feed(&FeedItem {
            id: link.to_string(),
            title: title.to_string(),
            link: link.to_string(),
            summary: format!("Demo feed entry #{}", i + 1),
            published: "2024-01-01T00:00:00Z".to_string(),
        })
    });
    StreamSource::new("rss:demo", items)
}

fn demo_messages() -> StreamSource {
    let script = [
        (5, json!({ "text": "A user just joined the chat!", "user": "demo_user" })),
        (7, json!({ "text": "System performance alert detected", "severity": "warning" })),
    ];
    let messages = stream::iter(script).then(|(delay, payload)| async move {
        tokio::time::sleep(Duration::from_secs(delay)).await;
        Event::message(payload)
    });
    StreamSource::new("custom", messages)
}

async fn print_notification(n: Notification) -> Result<(), SinkError> {
    println!("\nPROACTIVE MESSAGE ({} / {}):", n.source, n.origin);
    println!("   Text: {}", n.text);
    if let Some(detail) = &n.detail {
        println!("   Event data: {}", serde_json::Value::Object(detail.clone()));
    }
    println!("{}", "-".repeat(50));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proactive=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config {
        rule_text: "Hello! This is a friendly reminder from your assistant!".into(),
        ..Config::default()
    };

    let mgr = ProactiveManager::builder(SinkFn::arc(print_notification))
        .with_config(cfg)
        .with_oracle(Arc::new(DemoOracle))
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();

    println!("Proactive chat demo: press Ctrl+C to stop.\n");
    mgr.run_until_signal(vec![
        TickSource::new(Duration::from_secs(15)).boxed(),
        demo_feed().boxed(),
        demo_messages().boxed(),
    ])
    .await?;

    println!("Proactive manager stopped");
    Ok(())
}
