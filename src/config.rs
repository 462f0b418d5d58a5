//! # Manager configuration.
//!
//! Provides [`Config`], the settings consumed by
//! [`ProactiveManager::builder`](crate::ProactiveManager::builder).
//!
//! Per-source settings (tick interval, poll interval, seen-set capacity, retry
//! backoff) live on the source builders instead.
//!
//! ## Sentinel values
//! - `oracle_timeout = 0s` → [`DEFAULT_ORACLE_TIMEOUT`]
//! - `grace = 0s` → do not wait for sources on stop, abort them immediately
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::policies::DEFAULT_KEYWORDS;

/// Oracle timeout used when `oracle_timeout` is zero.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Text of every time-based notification unless overridden.
pub const DEFAULT_RULE_TEXT: &str = "Send a short friendly reminder every 5 minutes.";

/// Configuration for the proactive manager.
///
/// ## Field semantics
/// - `rule_text`: notification text for `tick` events
/// - `enabled`: initial state of the delivery gate
/// - `keywords`: title keywords used by the rule strategy
/// - `oracle_timeout`: hard bound on one oracle judgment (`0s` = default)
/// - `grace`: maximum wait for sources to stop before aborting them
/// - `bus_capacity`: signal bus ring buffer size (min 1)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Text used verbatim for every `tick` notification.
    pub rule_text: String,

    /// Whether delivery starts enabled.
    pub enabled: bool,

    /// Case-insensitive title keywords for the rule strategy.
    ///
    /// Ignored when an oracle or a custom policy is configured.
    pub keywords: Vec<String>,

    /// Upper bound for one oracle call, including stream consumption.
    pub oracle_timeout: Duration,

    /// Maximum time `stop` waits for every source to end.
    ///
    /// Sources still running afterwards are aborted and `run` returns
    /// `RuntimeError::GraceExceeded`.
    pub grace: Duration,

    /// Capacity of the signal bus broadcast channel.
    ///
    /// Observers lagging more than `bus_capacity` signals skip older ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the effective oracle timeout.
    #[inline]
    pub fn oracle_timeout(&self) -> Duration {
        if self.oracle_timeout.is_zero() {
            DEFAULT_ORACLE_TIMEOUT
        } else {
            self.oracle_timeout
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `rule_text` = [`DEFAULT_RULE_TEXT`]
    /// - `enabled = true`
    /// - `keywords` = [`DEFAULT_KEYWORDS`]
    /// - `oracle_timeout = 30s`
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            rule_text: DEFAULT_RULE_TEXT.to_string(),
            enabled: true,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}
