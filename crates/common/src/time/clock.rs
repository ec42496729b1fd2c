//! Clock abstraction for testability
//!
//! Provides a trait-based approach to wall-clock time that allows for
//! deterministic testing without relying on actual time passage. All
//! engine-level temporal arithmetic goes through a [`Clock`] so tests can
//! advance time explicitly.
//!
//! # Examples
//!
//! ```
//! use chrono::Duration;
//! use workledger_common::time::clock::{Clock, MockClock, SystemClock};
//!
//! // Use the system clock in production
//! let clock = SystemClock;
//! let _now = clock.now();
//!
//! // Use the mock clock in tests
//! let mock = MockClock::new();
//! let start = mock.now();
//! mock.advance(Duration::minutes(5));
//! assert_eq!(mock.now() - start, Duration::minutes(5));
//! ```

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Trait for wall-clock access
///
/// Engines hold an `Arc<dyn Clock>` and never call `Utc::now()` directly,
/// which keeps elapsed/paused-duration math deterministic under test.
pub trait Clock: Send + Sync {
    /// Get the current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock implementation
///
/// Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for deterministic testing
///
/// Starts at a fixed base time and only moves when advanced manually.
/// Clones share the same offset, so a clock handed to an engine can be
/// driven from the test body.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use workledger_common::time::clock::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// clock.advance(Duration::seconds(90));
/// assert_eq!(clock.elapsed(), Duration::seconds(90));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    base: DateTime<Utc>,
    offset: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock anchored at the current real time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a new mock clock anchored at a specific base time
    pub fn at(base: DateTime<Utc>) -> Self {
        Self { base, offset: Arc::new(Mutex::new(Duration::zero())) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        // Test utility: panic on poisoned mutex to fail tests early
        let mut offset = self.offset.lock().expect("mutex poisoned");
        *offset += duration;
    }

    /// Set the mock clock to an absolute offset from its base time
    pub fn set_elapsed(&self, duration: Duration) {
        // Test utility: panic on poisoned mutex to fail tests early
        let mut offset = self.offset.lock().expect("mutex poisoned");
        *offset = duration;
    }

    /// Get the simulated time elapsed since the base time
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        // Test utility: panic on poisoned mutex to fail tests early
        *self.offset.lock().expect("mutex poisoned")
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + self.elapsed()
    }
}
