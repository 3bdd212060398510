//! Clock seam
//!
//! Expiry decisions compare against an injected clock so tests can pin
//! the boundary exactly instead of racing wall time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current time as unix epoch milliseconds.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Wall-clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Manually advanced clock for tests and replay harnesses.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: u64) {
        self.now.store(now_millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_2024() {
        // 2024-01-01T00:00:00Z in millis
        assert!(SystemClock.now_millis() > 1_704_067_200_000);
    }

    #[test]
    fn manual_clock_reports_set_value() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.set(2_000);
        assert_eq!(clock.now_millis(), 2_000);
    }
}
