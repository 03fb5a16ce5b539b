// Time source for cache timestamps.
// Real caches read the system clock; tests drive a manual one forward.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDateTime, SubsecRound, Utc};

/// Supplies the current time used for `created_at` and expiry checks.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the cache.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Start at the current wall-clock second.
    pub fn starting_now() -> Self {
        Self::new(Utc::now().naive_utc().trunc_subsecs(0))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    pub fn set(&self, to: NaiveDateTime) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::starting_now();
        let start = clock.now();

        clock.advance(Duration::seconds(61));

        assert_eq!(clock.now() - start, Duration::seconds(61));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::starting_now();
        let handle = clock.clone();

        handle.advance(Duration::minutes(5));

        assert_eq!(clock.now(), handle.now());
    }
}
