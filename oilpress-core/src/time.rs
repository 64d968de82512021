//! Time management for the calibration routine
//!
//! The core never sleeps on its own. Anything that needs to wait (the
//! boot-time pull-up calibration) is written as a state machine that is
//! polled with the current time, so it can be driven by:
//! - A hardware timer on the device
//! - `std::time::Instant` on a host (`MonotonicClock`)
//! - A scripted clock in tests (`MockTimeSource`)

use core::cell::Cell;

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since an arbitrary epoch (usually boot)
pub type Timestamp = u64;

/// Controllable time source for tests and simulations
///
/// Time only moves when told to, either explicitly through [`advance`] or
/// implicitly by `auto_step` milliseconds after every [`now`] call. The
/// auto-step mode lets a busy-polling loop run to completion instantly.
///
/// [`advance`]: MockTimeSource::advance
/// [`now`]: TimeSource::now
#[derive(Debug, Clone)]
pub struct MockTimeSource {
    timestamp: Cell<Timestamp>,
    auto_step: u64,
}

impl MockTimeSource {
    /// Start a clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
            auto_step: 0,
        }
    }

    /// Advance by `step_ms` after every read
    pub fn with_auto_step(mut self, step_ms: u64) -> Self {
        self.auto_step = step_ms;
        self
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        let current = self.timestamp.get();
        if self.auto_step > 0 {
            self.timestamp.set(current.saturating_add(self.auto_step));
        }
        current
    }
}

/// Monotonic host clock (requires std)
///
/// Counts milliseconds since construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start counting from now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}
