//! # Oracle-backed strategy.
//!
//! [`OracleStrategy`] asks an [`Oracle`] for a binary verdict:
//!
//! ```text
//! [system] SYSTEM_PROMPT
//! [user]   "Event: " + pretty JSON of the event
//!      │
//!      ▼
//! oracle.complete() ──► fragment stream ──► concat ──► uppercase ──► contains "YES"?
//!      └──────────── wrapped in tokio::time::timeout(timeout) ───────────┘
//! ```
//!
//! Submission errors, stream errors and timeouts surface as [`DecisionError`]; the
//! manager turns them into "do not notify".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use crate::error::{DecisionError, OracleError};
use crate::event::Event;
use crate::oracle::{Oracle, PromptMessage};
use crate::policies::Decide;

/// Fixed instruction sent as the system message.
pub const SYSTEM_PROMPT: &str = "You decide if an event needs a user notification. \
Reply with only YES or NO based on whether the event is interesting enough to notify users about.";

/// Policy delegating the verdict to an external oracle.
#[derive(Clone)]
pub struct OracleStrategy {
    oracle: Arc<dyn Oracle>,
    timeout: Duration,
}

impl OracleStrategy {
    /// Creates a strategy bounded by `timeout` per decision.
    pub fn new(oracle: Arc<dyn Oracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the two-message prompt for `event`.
    pub fn prompt(event: &Event) -> Vec<PromptMessage> {
        // Serializing a map of JSON values cannot fail; fall back to Debug regardless.
        let body = serde_json::to_string_pretty(event).unwrap_or_else(|_| format!("{event:?}"));
        vec![
            PromptMessage::system(SYSTEM_PROMPT),
            PromptMessage::user(format!("Event: {body}")),
        ]
    }

    /// Positive iff the uppercased answer contains `YES`.
    pub fn is_affirmative(answer: &str) -> bool {
        answer.to_uppercase().contains("YES")
    }

    async fn ask(&self, event: &Event) -> Result<String, OracleError> {
        let mut fragments = self.oracle.complete(Self::prompt(event)).await?;
        let mut answer = String::new();
        while let Some(fragment) = fragments.next().await {
            answer.push_str(&fragment?);
        }
        Ok(answer)
    }
}

#[async_trait]
impl Decide for OracleStrategy {
    async fn decide(&self, event: &Event) -> Result<bool, DecisionError> {
        match tokio::time::timeout(self.timeout, self.ask(event)).await {
            Ok(answer) => Ok(Self::is_affirmative(&answer?)),
            Err(_elapsed) => Err(DecisionError::Timeout {
                timeout: self.timeout,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "oracle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FeedItem;
    use crate::oracle::{FragmentStream, Role};
    use futures::stream;
    use std::sync::Mutex;

    /// Answers YES for anything mentioning "Episode", split into fragments.
    #[derive(Default)]
    struct EpisodeOracle {
        seen: Mutex<Vec<Vec<PromptMessage>>>,
    }

    #[async_trait]
    impl Oracle for EpisodeOracle {
        async fn complete(&self, messages: Vec<PromptMessage>) -> Result<FragmentStream, OracleError> {
            let content = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            self.seen.lock().unwrap().push(messages);
            let parts: Vec<Result<String, OracleError>> = if content.contains("Episode") {
                vec![Ok(" y".into()), Ok("es".into())]
            } else {
                vec![Ok("NO".into())]
            };
            Ok(stream::iter(parts).boxed())
        }
    }

    struct DownOracle;

    #[async_trait]
    impl Oracle for DownOracle {
        async fn complete(&self, _: Vec<PromptMessage>) -> Result<FragmentStream, OracleError> {
            Err(OracleError::Unavailable {
                error: "connection refused".into(),
            })
        }
    }

    struct BrokenStreamOracle;

    #[async_trait]
    impl Oracle for BrokenStreamOracle {
        async fn complete(&self, _: Vec<PromptMessage>) -> Result<FragmentStream, OracleError> {
            Ok(stream::iter([
                Ok("YE".to_string()),
                Err(OracleError::Stream {
                    error: "reset by peer".into(),
                }),
            ])
            .boxed())
        }
    }

    struct SilentOracle;

    #[async_trait]
    impl Oracle for SilentOracle {
        async fn complete(&self, _: Vec<PromptMessage>) -> Result<FragmentStream, OracleError> {
            Ok(stream::pending::<Result<String, OracleError>>().boxed())
        }
    }

    fn feed(title: &str) -> Event {
        Event::feed(&FeedItem {
            id: title.into(),
            title: title.into(),
            link: "https://example.com/x".into(),
            ..FeedItem::default()
        })
    }

    #[test]
    fn prompt_has_instruction_and_serialized_event() {
        let msgs = OracleStrategy::prompt(&feed("New Episode 10 released!"));
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[0].content, SYSTEM_PROMPT);
        assert_eq!(msgs[1].role, Role::User);
        assert!(msgs[1].content.starts_with("Event: {"));
        assert!(msgs[1].content.contains("\"category\": \"feed\""));
        assert!(msgs[1].content.contains("New Episode 10 released!"));
    }

    #[test]
    fn affirmative_is_case_insensitive_substring() {
        assert!(OracleStrategy::is_affirmative("yes"));
        assert!(OracleStrategy::is_affirmative("Yes, definitely."));
        assert!(!OracleStrategy::is_affirmative("NO"));
        assert!(!OracleStrategy::is_affirmative(""));
    }

    #[tokio::test]
    async fn concatenates_fragments_before_judging() {
        let oracle = Arc::new(EpisodeOracle::default());
        let strategy = OracleStrategy::new(oracle.clone(), Duration::from_secs(1));

        assert!(strategy.decide(&feed("New Episode 10 released!")).await.unwrap());
        assert!(!strategy.decide(&feed("Boring maintenance update")).await.unwrap());
        assert_eq!(oracle.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn submission_failure_is_an_error() {
        let strategy = OracleStrategy::new(Arc::new(DownOracle), Duration::from_secs(1));
        let err = strategy.decide(&feed("New Episode")).await.unwrap_err();
        assert_eq!(err.as_label(), "oracle_unavailable");
    }

    #[tokio::test]
    async fn stream_failure_discards_partial_answer() {
        let strategy = OracleStrategy::new(Arc::new(BrokenStreamOracle), Duration::from_secs(1));
        let err = strategy.decide(&feed("anything")).await.unwrap_err();
        assert_eq!(err.as_label(), "oracle_stream");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_oracle_times_out() {
        let strategy = OracleStrategy::new(Arc::new(SilentOracle), Duration::from_secs(30));
        let err = strategy.decide(&feed("anything")).await.unwrap_err();
        assert!(matches!(err, DecisionError::Timeout { timeout } if timeout == Duration::from_secs(30)));
    }
}
