use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until `is_high` reports false (line pulled low) or `timeout` expires.
/// Sleeps `poll_interval` between checks instead of spinning.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Median of a small sample burst; rejects single-sample spikes from the
/// load cell. Returns `None` for an empty slice.
pub fn median_i32(samples: &mut [i32]) -> Option<i32> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        Some(samples[mid])
    } else {
        let a = i64::from(samples[mid - 1]);
        let b = i64::from(samples[mid]);
        i32::try_from((a + b) / 2).ok()
    }
}

/// Servo pulse width for `angle` degrees, mapped linearly onto 0.5..=2.5 ms.
pub fn servo_pulse(angle: u8) -> Duration {
    let a = u64::from(angle.min(180));
    Duration::from_micros(500 + a * 2000 / 180)
}
