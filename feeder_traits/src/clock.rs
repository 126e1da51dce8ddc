use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock abstraction for control and timing across the stack.
///
/// - now(): returns a monotonic Instant
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - ms_since(): helper to compute elapsed milliseconds from an epoch Instant
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        dur.as_millis() as u64
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Broken-down calendar time as delivered by an RTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

impl From<time::PrimitiveDateTime> for DateTime {
    fn from(dt: time::PrimitiveDateTime) -> Self {
        Self {
            year: u16::try_from(dt.year()).unwrap_or(0),
            month: u8::from(dt.month()),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }
}

impl From<time::OffsetDateTime> for DateTime {
    fn from(dt: time::OffsetDateTime) -> Self {
        Self::from(time::PrimitiveDateTime::new(dt.date(), dt.time()))
    }
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Source of wall-clock time (battery-backed RTC, host clock, ...).
pub trait WallClock {
    fn now(&self) -> Result<DateTime, Box<dyn std::error::Error + Send + Sync>>;
}

/// Free-running wall clock: a fixed epoch plus whole seconds elapsed since
/// construction, as measured by the monotonic `Clock`.
#[derive(Clone)]
pub struct SyntheticWallClock {
    epoch: time::PrimitiveDateTime,
    clock: Arc<dyn Clock + Send + Sync>,
    boot: Instant,
}

impl core::fmt::Debug for SyntheticWallClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyntheticWallClock")
            .field("epoch", &self.epoch)
            .field("elapsed_ms", &self.clock.ms_since(self.boot))
            .finish()
    }
}

impl SyntheticWallClock {
    pub fn new(epoch: time::PrimitiveDateTime, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let boot = clock.now();
        Self { epoch, clock, boot }
    }

    /// Current synthetic time; never fails.
    pub fn current(&self) -> DateTime {
        let secs = (self.clock.ms_since(self.boot) / 1000) as i64;
        DateTime::from(self.epoch.saturating_add(time::Duration::seconds(secs)))
    }
}

impl WallClock for SyntheticWallClock {
    fn now(&self) -> Result<DateTime, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.current())
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;

    /// Deterministic test clock whose time can be advanced manually.
    ///
    /// now() = origin + offset
    /// sleep(d) advances internal time by d without actually sleeping.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: std::sync::Arc<std::sync::Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: std::sync::Arc::new(std::sync::Mutex::new(Duration::ZERO)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Set the absolute offset relative to origin (useful for tests).
        pub fn set_offset(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = d;
            }
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_clock::TestClock;
    use super::*;
    use time::macros::datetime;

    #[test]
    fn synthetic_clock_counts_whole_seconds_from_epoch() {
        let tc = TestClock::new();
        let wall = SyntheticWallClock::new(datetime!(2025-01-01 07:59:58), Arc::new(tc.clone()));
        assert_eq!(wall.current(), DateTime::new(2025, 1, 1, 7, 59, 58));

        tc.advance(Duration::from_millis(1_999));
        assert_eq!(wall.current(), DateTime::new(2025, 1, 1, 7, 59, 59));

        tc.advance(Duration::from_millis(1));
        assert_eq!(wall.current(), DateTime::new(2025, 1, 1, 8, 0, 0));
    }

    #[test]
    fn synthetic_clock_rolls_over_midnight() {
        let tc = TestClock::new();
        let wall = SyntheticWallClock::new(datetime!(2024-12-31 23:59:59), Arc::new(tc.clone()));
        tc.advance(Duration::from_secs(2));
        assert_eq!(wall.current(), DateTime::new(2025, 1, 1, 0, 0, 1));
    }

    #[test]
    fn display_is_zero_padded() {
        let dt = DateTime::new(2025, 3, 7, 8, 5, 9);
        assert_eq!(dt.to_string(), "2025-03-07 08:05:09");
    }
}
