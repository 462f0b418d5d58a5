//! # Retry backoff for polling sources.
//!
//! [`RetryBackoff`] controls how quickly a polling source retries after consecutive
//! failed polls. The delay for failure `n` (0-indexed) is `first × factor^n`,
//! clamped to `max`, then [`Jitter`] is applied. The base is derived from `n` alone,
//! so jitter output never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use proactive::{Jitter, RetryBackoff};
//!
//! let backoff = RetryBackoff {
//!     first: Duration::from_secs(1),
//!     max: Duration::from_secs(60),
//!     factor: 2.0,
//!     jitter: Jitter::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_secs(1));
//! assert_eq!(backoff.next(3), Duration::from_secs(8));
//! assert_eq!(backoff.next(10), Duration::from_secs(60));
//! ```

use std::time::Duration;

use rand::Rng;

/// Randomization applied to a retry delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Exact delay.
    #[default]
    None,
    /// Random delay in `[0, delay]`.
    Full,
    /// `delay/2 + random[0, delay/2]`.
    Equal,
}

impl Jitter {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(rng.random_range(0..=ms)),
            Jitter::Equal => {
                let half = ms / 2;
                let extra = if half == 0 { 0 } else { rng.random_range(0..=half) };
                Duration::from_millis(half + extra)
            }
        }
    }
}

/// Retry backoff for consecutive failed polls.
#[derive(Clone, Copy, Debug)]
pub struct RetryBackoff {
    /// Delay after the first failure.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: Jitter,
}

impl Default for RetryBackoff {
    /// `first = 5s`, `max = 5min`, `factor = 2.0`, equal jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(5),
            max: Duration::from_secs(300),
            factor: 2.0,
            jitter: Jitter::Equal,
        }
    }
}

impl RetryBackoff {
    /// Computes the delay after `failures` consecutive failures (0-indexed).
    pub fn next(&self, failures: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = failures.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}
