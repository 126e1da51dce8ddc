//! Host wall clock.

use feeder_traits::{DateTime, WallClock};
use time::UtcOffset;

use crate::error::HwError;

/// Local date-time from the host (RTC-backed on the Pi).
///
/// The local UTC offset is resolved once at construction: `time` refuses to
/// look it up once the process has more than one thread. Construct this
/// before spawning signal handlers or workers. If the offset is unknown every
/// `now()` fails and callers fall back to a synthetic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemWallClock {
    offset: Option<UtcOffset>,
}

impl Default for SystemWallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemWallClock {
    pub fn new() -> Self {
        let offset = match UtcOffset::current_local_offset() {
            Ok(o) => Some(o),
            Err(e) => {
                tracing::debug!(error = %e, "local UTC offset unavailable");
                None
            }
        };
        Self { offset }
    }

    /// Fixed offset (tests, or hosts that keep UTC).
    pub fn with_offset(offset: UtcOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }
}

impl WallClock for SystemWallClock {
    fn now(&self) -> Result<DateTime, Box<dyn std::error::Error + Send + Sync>> {
        let offset = self
            .offset
            .ok_or_else(|| HwError::Clock("local UTC offset could not be determined".into()))?;
        Ok(DateTime::from(time::OffsetDateTime::now_utc().to_offset(offset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_clock_reports_a_plausible_date() {
        let now = SystemWallClock::with_offset(UtcOffset::UTC).now().unwrap();
        assert!(now.year >= 2024);
        assert!((1..=12).contains(&now.month));
        assert!(now.hour < 24 && now.minute < 60);
    }
}
