//! Match time.
//!
//! `GameTime` is the elapsed time since match start. Expiry math runs on
//! `Duration` (integer nanoseconds), so comparisons are exact.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub type GameTime = Duration;

pub trait Clock {
    fn now(&self) -> GameTime;

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    fn elapsed_since(&self, earlier: GameTime) -> Duration {
        self.now().saturating_sub(earlier)
    }
}

/// Convert seconds to a `GameTime`. Negative, NaN and overflowing inputs clamp to zero.
pub fn secs(seconds: f64) -> GameTime {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}

/// Monotonic wall clock measuring time since the match started
#[derive(Debug, Clone, Copy)]
pub struct MatchClock {
    started: Instant,
}

impl MatchClock {
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }
}

impl Default for MatchClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for MatchClock {
    fn now(&self) -> GameTime {
        self.started.elapsed()
    }
}

/// Hand-driven clock for tests and scenario replay.
///
/// Clones share the same time, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_secs(seconds: f64) -> Self {
        let clock = Self::new();
        clock.set_secs(seconds);
        clock
    }

    pub fn set(&self, now: GameTime) {
        self.now.set(now);
    }

    pub fn set_secs(&self, seconds: f64) {
        self.now.set(secs(seconds));
    }

    pub fn advance_secs(&self, seconds: f64) {
        self.now.set(self.now.get().saturating_add(secs(seconds)));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> GameTime {
        self.now.get()
    }
}
