//! Time abstraction for testability
//!
//! Session expiry math depends on wall-clock time. Hard-wiring `Utc::now()`
//! would make the refresh-margin boundary untestable without sleeping, so the
//! session manager is generic over this trait.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Trait for time operations to enable testing
pub trait Clock: Send + Sync {
    /// Current monotonic instant, for measuring durations
    fn now(&self) -> Instant;

    /// Current wall-clock time (UTC)
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real system clock implementation. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for deterministic testing
///
/// Starts at the current real time and can be advanced manually without
/// waiting. Clones share the same elapsed time.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    base_utc: DateTime<Utc>,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self { start: Instant::now(), base_utc: Utc::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Simulate time passing without actually waiting
    pub fn advance(&self, duration: Duration) {
        // Test utility: panic on poisoned mutex to fail tests early
        let mut elapsed = self.elapsed.lock().expect("mutex poisoned");
        *elapsed += duration;
    }

    /// Set the simulated elapsed time to an absolute value
    pub fn set_elapsed(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock().expect("mutex poisoned");
        *elapsed = duration;
    }

    /// How much time has been simulated since creation
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().expect("mutex poisoned")
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().expect("mutex poisoned")
    }

    fn now_utc(&self) -> DateTime<Utc> {
        let elapsed = *self.elapsed.lock().expect("mutex poisoned");
        self.base_utc + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero())
    }
}
