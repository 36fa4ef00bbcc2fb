//! Time source for event start and end times.
//!
//! Lineage members are keyed by the start time of their generating event,
//! so the engine needs timestamps that never repeat. [`SystemClock`] bumps
//! by one millisecond whenever the wall clock has not moved on.

use parking_lot::Mutex;
use rmap_core::Timestamp;

/// A source of timestamps.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current time. Successive calls return strictly increasing values.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time, strictly increasing across calls.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<Timestamp>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let mut last = self.last.lock();
        let wall = Timestamp::now();
        let next = match *last {
            Some(prev) if wall <= prev => prev.checked_add_millis(1).unwrap_or(wall),
            _ => wall,
        };
        *last = Some(next);
        next
    }
}

/// A clock driven by the caller. Each reading advances it by `step_millis`.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
    step_millis: i64,
}

impl ManualClock {
    /// Starts at `start` and advances one millisecond per reading.
    pub fn new(start: Timestamp) -> Self {
        Self::with_step(start, 1)
    }

    pub fn with_step(start: Timestamp, step_millis: i64) -> Self {
        Self {
            current: Mutex::new(start),
            step_millis: step_millis.max(1),
        }
    }

    /// Jump to `to`. Moving backwards is allowed; tests use it to model skew.
    pub fn set(&self, to: Timestamp) {
        *self.current.lock() = to;
    }

    pub fn advance(&self, millis: i64) {
        let mut current = self.current.lock();
        if let Some(next) = current.checked_add_millis(millis) {
            *current = next;
        }
    }

    /// The next value [`Clock::now`] will return.
    pub fn peek(&self) -> Timestamp {
        *self.current.lock()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut current = self.current.lock();
        let reading = *current;
        if let Some(next) = current.checked_add_millis(self.step_millis) {
            *current = next;
        }
        reading
    }
}
