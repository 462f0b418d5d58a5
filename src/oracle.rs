//! # Decision oracle capability.
//!
//! An [`Oracle`] is an external judgment service (typically a language model). It
//! receives an ordered list of role-tagged messages and answers with a stream of text
//! fragments that the caller concatenates.
//!
//! The crate does not ship a concrete oracle; hosts adapt their model client to this trait.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use futures::stream::{self, StreamExt};
//! use proactive::{FragmentStream, Oracle, OracleError, PromptMessage};
//!
//! /// Says YES to anything mentioning an episode.
//! struct EpisodeOracle;
//!
//! #[async_trait]
//! impl Oracle for EpisodeOracle {
//!     async fn complete(&self, messages: Vec<PromptMessage>) -> Result<FragmentStream, OracleError> {
//!         let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
//!         let answer = if last.contains("Episode") { "YES" } else { "NO" };
//!         Ok(stream::iter([Ok(answer.to_string())]).boxed())
//!     }
//! }
//! ```

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Streamed oracle response: text fragments in order, or a mid-stream error.
pub type FragmentStream = BoxStream<'static, Result<String, OracleError>>;

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged prompt message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// External judgment capability.
///
/// Timeouts are applied by the caller ([`OracleStrategy`](crate::OracleStrategy)); an
/// implementation may add its own.
#[async_trait]
pub trait Oracle: Send + Sync + 'static {
    /// Submits `messages` and returns the streamed response.
    async fn complete(&self, messages: Vec<PromptMessage>) -> Result<FragmentStream, OracleError>;

    /// Returns the oracle name used in logs.
    fn name(&self) -> &str {
        "oracle"
    }
}
