//! Time provider abstraction
//!
//! Account creation timestamps, event ids and sequences are all derived from
//! a [`Clock`], so tests can pin time while production code reads the system
//! clock.
//!
//! # Example
//!
//! ```
//! use eventvault::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let created = clock.now_utc();
//! assert!(created.timestamp_millis() > 0);
//! ```

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time as a UTC timestamp.
    fn now_utc(&self) -> DateTime<Utc> {
        let millis = i64::try_from(self.now_millis()).unwrap_or(i64::MAX);
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Test clock that advances by a fixed step on every read.
///
/// A step of zero freezes the clock, which is how tests force several
/// sequences to be generated within the same millisecond.
///
/// ```
/// use eventvault::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// assert_eq!(clock.now_millis(), 1000);
/// assert_eq!(clock.now_millis(), 1001);
///
/// let frozen = FixedClock::frozen(1000);
/// assert_eq!(frozen.now_millis(), frozen.now_millis());
/// ```
#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
pub struct FixedClock {
    state: Mutex<FixedClockState>,
}

#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
struct FixedClockState {
    millis: u64,
    step: u64,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a clock starting at `millis` that advances one millisecond per read.
    pub fn new(millis: u64) -> Self {
        Self::with_step(millis, 1)
    }

    /// Create a clock that never advances on its own.
    pub fn frozen(millis: u64) -> Self {
        Self::with_step(millis, 0)
    }

    /// Create a clock that advances by `step` milliseconds per read.
    pub fn with_step(millis: u64, step: u64) -> Self {
        Self {
            state: Mutex::new(FixedClockState { millis, step }),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.state.lock().unwrap().millis += ms;
    }

    /// Set the clock to a specific time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.state.lock().unwrap().millis = ms;
    }

    /// Get the current time without advancing.
    pub fn get(&self) -> u64 {
        self.state.lock().unwrap().millis
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        let mut state = self.state.lock().unwrap();
        let t = state.millis;
        state.millis += state.step;
        t
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1704067200000)
    }
}
