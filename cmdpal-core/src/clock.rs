//! Time sources for hover-intent timers.
//!
//! Production hosts use [`WallClock`]. Tests use [`ManualClock`], where time
//! only moves when advanced explicitly, so debounce windows can be checked
//! without sleeping.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Abstraction over monotonic time.
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
}

/// `Instant::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock advanced by hand.
#[derive(Debug)]
pub struct ManualClock {
    anchor: Instant,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    /// Start at an arbitrary fixed instant
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Move time forward by whole milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Virtual time since creation
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.anchor + self.elapsed.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
