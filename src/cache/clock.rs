//! Clock Module
//!
//! Time source used to stamp entries and measure their age.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// == Clock Trait ==
/// Monotonic time source.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

// == System Clock ==
/// Real monotonic clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// == Mock Clock ==
/// Manually advanced clock for deterministic expiration tests.
///
/// Clones share the same elapsed time, so a test can keep one handle and
/// advance it while the cache holds another.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Creates a mock clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        *self.lock() += duration;
    }

    /// Sets the total time elapsed since the clock was created.
    pub fn set_elapsed(&self, duration: Duration) {
        *self.lock() = duration;
    }

    /// Returns the total time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.lock()
    }

    // A panic while holding the lock cannot leave a `Duration` half-written.
    fn lock(&self) -> MutexGuard<'_, Duration> {
        self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_is_frozen_until_advanced() {
        let clock = MockClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::from_secs(3));
        assert_eq!(clock.now() - t0, Duration::from_secs(3));
    }

    #[test]
    fn test_mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let other = clock.clone();

        clock.advance(Duration::from_millis(250));
        assert_eq!(other.elapsed(), Duration::from_millis(250));

        other.set_elapsed(Duration::from_secs(12));
        assert_eq!(clock.elapsed(), Duration::from_secs(12));
    }

    #[test]
    fn test_mock_clock_survives_poisoned_lock() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(5));
        let t0 = clock.now();

        let shared = clock.clone();
        let result = std::thread::spawn(move || {
            let _guard = shared.elapsed.lock().unwrap();
            panic!("poison the clock");
        })
        .join();
        assert!(result.is_err());
        assert!(clock.elapsed.is_poisoned());

        // Time keeps its value and still moves.
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
        assert_eq!(clock.now(), t0);
        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now() - t0, Duration::from_secs(2));
        clock.set_elapsed(Duration::from_secs(30));
        assert_eq!(clock.elapsed(), Duration::from_secs(30));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
