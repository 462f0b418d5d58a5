//! Error types used by the proactive runtime and its collaborators.
//!
//! This module defines one enum per failure class:
//!
//! - [`SourceError`]: a single event failed to materialize (or the source cannot start at all).
//! - [`OracleError`]: the external judgment call failed.
//! - [`DecisionError`]: the decision policy could not reach a verdict.
//! - [`SinkError`]: delivery of a notification failed.
//! - [`RuntimeError`]: the manager itself could not shut down or keep consuming cleanly.
//!
//! None of these is fatal to the process. All of them provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the manager's orchestration layer.
///
/// Returned from [`ProactiveManager::run`](crate::ProactiveManager::run) after teardown
/// has completed; the manager is back to idle when the caller observes one.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Some sources did not stop within the grace period and were aborted.
    #[error("sources did not stop within {grace:?}; aborted: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the sources that had to be aborted.
        stuck: Vec<String>,
    },

    /// The consumer loop itself faulted (not an individual event's processing).
    #[error("consumer loop faulted: {reason}")]
    ConsumerFault {
        /// Panic payload or description.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use proactive::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::ConsumerFault { .. } => "runtime_consumer_fault",
        }
    }
}

/// # Errors produced by event sources.
///
/// Yielded as `Err` items of an [`EventStream`](crate::EventStream). Everything except
/// [`SourceError::Fatal`] describes one failed production; the sequence continues.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SourceError {
    /// Fetching upstream data failed (network, HTTP status, ...).
    #[error("fetch from {url} failed: {error}")]
    Fetch {
        /// What was being fetched.
        url: String,
        /// The underlying error message.
        error: String,
    },

    /// Upstream data arrived but could not be parsed.
    #[error("parse failed: {error}")]
    Parse {
        /// The underlying error message.
        error: String,
    },

    /// Unrecoverable error; the source ends.
    #[error("fatal source error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The source observed cancellation.
    #[error("source cancelled")]
    Canceled,
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::Fetch { .. } => "source_fetch",
            SourceError::Parse { .. } => "source_parse",
            SourceError::Fatal { .. } => "source_fatal",
            SourceError::Canceled => "source_canceled",
        }
    }

    /// Returns `true` if the source should end after yielding this error.
    ///
    /// # Example
    /// ```
    /// use proactive::SourceError;
    ///
    /// assert!(!SourceError::Parse { error: "bad xml".into() }.is_terminal());
    /// assert!(SourceError::Fatal { error: "no url".into() }.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceError::Fatal { .. } | SourceError::Canceled)
    }
}

/// # Errors produced by an [`Oracle`](crate::Oracle).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OracleError {
    /// The request could not be submitted or was rejected.
    #[error("oracle unavailable: {error}")]
    Unavailable {
        /// The underlying error message.
        error: String,
    },

    /// The response stream broke off.
    #[error("oracle stream failed: {error}")]
    Stream {
        /// The underlying error message.
        error: String,
    },
}

/// # Errors produced while deciding whether to notify.
///
/// The manager treats every variant as "do not notify".
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DecisionError {
    /// The oracle failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The oracle did not finish within the configured timeout.
    #[error("oracle timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The policy panicked.
    #[error("decision panicked: {info}")]
    Panicked {
        /// Panic payload.
        info: String,
    },
}

impl DecisionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use proactive::DecisionError;
    /// use std::time::Duration;
    ///
    /// let err = DecisionError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "decision_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DecisionError::Oracle(OracleError::Unavailable { .. }) => "oracle_unavailable",
            DecisionError::Oracle(OracleError::Stream { .. }) => "oracle_stream",
            DecisionError::Timeout { .. } => "decision_timeout",
            DecisionError::Panicked { .. } => "decision_panicked",
        }
    }
}

/// # Errors produced by a [`BroadcastSink`](crate::BroadcastSink).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SinkError {
    /// Delivery failed.
    #[error("delivery failed: {error}")]
    Delivery {
        /// The underlying error message.
        error: String,
    },

    /// The sink no longer accepts notifications.
    #[error("sink closed")]
    Closed,

    /// The sink panicked.
    #[error("sink panicked: {info}")]
    Panicked {
        /// Panic payload.
        info: String,
    },
}

impl SinkError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::Delivery { .. } => "sink_delivery",
            SinkError::Closed => "sink_closed",
            SinkError::Panicked { .. } => "sink_panicked",
        }
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_errors_convert_into_decision_errors() {
        let err: DecisionError = OracleError::Unavailable {
            error: "connection refused".into(),
        }
        .into();
        assert_eq!(err.as_label(), "oracle_unavailable");
        assert_eq!(err.to_string(), "oracle unavailable: connection refused");
    }

    #[test]
    fn only_fatal_and_canceled_end_a_source() {
        assert!(
            !SourceError::Fetch {
                url: "https://example.com/feed".into(),
                error: "503".into(),
            }
            .is_terminal()
        );
        assert!(SourceError::Canceled.is_terminal());
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let a: Box<dyn std::any::Any + Send> = Box::new("boom");
        let b: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        let c: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(a.as_ref()), "boom");
        assert_eq!(panic_message(b.as_ref()), "bang");
        assert_eq!(panic_message(c.as_ref()), "unknown panic");
    }
}
