//! # Wall-clock ticks.
//!
//! [`TickSource`] emits a `tick` event at every boundary of its interval, counted
//! from the Unix epoch in UTC. Two sources with the same interval therefore fire
//! together, and a 5 minute interval fires at `:00`, `:05`, `:10`, ...
//!
//! The delay is recomputed from the wall clock before every tick, so a suspended
//! host or a stepped clock falls back into phase on the next boundary.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::event::Event;
use crate::sources::{EventSource, EventStream};

/// Time remaining from `now` until the next multiple of `interval` since the epoch.
///
/// A `now` exactly on a boundary yields a full interval. A zero interval is
/// treated as one millisecond.
///
/// # Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use proactive::next_boundary_delay;
/// use std::time::Duration;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 3, 30).unwrap();
/// let d = next_boundary_delay(now, Duration::from_secs(300));
/// assert_eq!(d, Duration::from_secs(90));
/// ```
pub fn next_boundary_delay(now: DateTime<Utc>, interval: Duration) -> Duration {
    let step = interval.as_millis().clamp(1, i64::MAX as u128) as i64;
    let elapsed = now.timestamp_millis().rem_euclid(step);
    Duration::from_millis((step - elapsed) as u64)
}

type WallClock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Epoch-aligned periodic source.
pub struct TickSource {
    name: String,
    interval: Duration,
    clock: WallClock,
}

impl TickSource {
    /// Creates a tick source named `"ticker"`.
    pub fn new(interval: Duration) -> Self {
        Self {
            name: "ticker".into(),
            interval: interval.max(Duration::from_millis(1)),
            clock: Arc::new(Utc::now),
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Overrides the source name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Boxes the source for registration.
    pub fn boxed(self) -> Box<dyn EventSource> {
        Box::new(self)
    }
}

impl EventSource for TickSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(self: Box<Self>, ctx: CancellationToken) -> EventStream {
        let TickSource {
            interval, clock, ..
        } = *self;
        let stream = async_stream::stream! {
            let mut fired: Option<DateTime<Utc>> = None;

            loop {
                let now = clock();
                // Never fire the same boundary twice, even if the timer wakes early.
                let from = fired.map_or(now, |b| b.max(now));
                let boundary = from + next_boundary_delay(from, interval);
                let delay = (boundary - now).to_std().unwrap_or_default();

                tokio::select! {
                    _ = ctx.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
                fired = Some(boundary);
                yield Ok(Event::tick(clock()));
            }
        };
        Box::pin(stream)
    }
}
