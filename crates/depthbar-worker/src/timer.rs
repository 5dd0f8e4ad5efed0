// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Self-resetting rate gate

use std::time::{Duration, Instant};

/// Bounds how often an action runs.
///
/// [`is_past`](RateTimer::is_past) is not a pure query: when it returns true the
/// baseline moves to now, so the next call only passes after another full
/// interval.
#[derive(Debug, Clone)]
pub struct RateTimer {
    interval: Duration,
    created: Instant,
    last_reset: Instant,
}

impl RateTimer {
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            created: now,
            last_reset: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when at least one interval has passed since the last reset.
    /// Resets the baseline when it returns true.
    pub fn is_past(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_reset) >= self.interval {
            self.last_reset = now;
            true
        } else {
            false
        }
    }

    /// Time since the last reset
    pub fn elapsed(&self) -> Duration {
        self.last_reset.elapsed()
    }

    /// Whole intervals elapsed since construction. Unaffected by resets.
    pub fn past_count(&self) -> u64 {
        let interval = self.interval.as_nanos();
        if interval == 0 {
            return 0;
        }
        u64::try_from(self.created.elapsed().as_nanos() / interval).unwrap_or(u64::MAX)
    }

    pub fn reset(&mut self) {
        self.last_reset = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_not_past_right_after_creation() {
        let mut timer = RateTimer::new(Duration::from_secs(60));
        assert!(!timer.is_past());
        assert_eq!(timer.past_count(), 0);
    }

    #[test]
    fn test_is_past_resets_baseline() {
        let mut timer = RateTimer::new(Duration::from_millis(20));
        thread::sleep(Duration::from_millis(30));

        assert!(timer.is_past());
        // The successful check moved the baseline
        assert!(!timer.is_past());
        assert!(timer.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn test_past_count_ignores_resets() {
        let mut timer = RateTimer::new(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(35));
        timer.reset();
        assert!(timer.past_count() >= 3);
        assert!(timer.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn test_zero_interval_always_passes() {
        let mut timer = RateTimer::new(Duration::ZERO);
        assert!(timer.is_past());
        assert!(timer.is_past());
        assert_eq!(timer.past_count(), 0);
    }
}
