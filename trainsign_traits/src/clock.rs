use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source for the main loop.
///
/// Fetch and sync intervals are measured against `now()`; the poll quantum
/// and the coprocessor settle delay go through `sleep()`.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Time since `since`; zero if `since` lies in the future.
    fn elapsed_since(&self, since: Instant) -> Duration {
        self.now().saturating_duration_since(since)
    }
}

/// Wall-clock-independent real time from `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

/// Clock that only moves when slept on or advanced.
///
/// Clones share one offset, so a test can keep a handle while the sign owns
/// another and observe every simulated sleep.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, d: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset = offset.saturating_add(d);
        }
    }

    /// Total simulated time since construction.
    pub fn elapsed(&self) -> Duration {
        self.offset
            .lock()
            .map(|offset| *offset)
            .unwrap_or(Duration::ZERO)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleeping_moves_manual_time() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_secs(2));
        assert_eq!(clock.elapsed_since(start), Duration::from_secs(2));
    }

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(Duration::from_millis(150));
        assert_eq!(b.elapsed(), Duration::from_millis(150));
    }

    #[test]
    fn future_instant_gives_zero() {
        let clock = ManualClock::new();
        let later = clock.now() + Duration::from_secs(5);
        assert_eq!(clock.elapsed_since(later), Duration::ZERO);
    }
}
