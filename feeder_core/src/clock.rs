//! Wall-clock source with synthetic fallback.

use std::sync::atomic::{AtomicBool, Ordering};

use feeder_traits::{DateTime, SyntheticWallClock, WallClock};

/// Prefers a primary wall clock and falls back to a synthetic one.
///
/// The first primary failure is logged and latched; from then on only the
/// synthetic clock is consulted.
pub struct FallbackClock {
    primary: Option<Box<dyn WallClock + Send + Sync>>,
    synthetic: SyntheticWallClock,
    fallen_back: AtomicBool,
}

impl core::fmt::Debug for FallbackClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FallbackClock")
            .field("has_primary", &self.primary.is_some())
            .field("synthetic", &self.synthetic)
            .field("fallen_back", &self.is_fallen_back())
            .finish()
    }
}

impl FallbackClock {
    pub fn new(primary: Option<Box<dyn WallClock + Send + Sync>>, synthetic: SyntheticWallClock) -> Self {
        let fallen_back = AtomicBool::new(primary.is_none());
        Self {
            primary,
            synthetic,
            fallen_back,
        }
    }

    /// Synthetic-only clock.
    pub fn synthetic(synthetic: SyntheticWallClock) -> Self {
        Self::new(None, synthetic)
    }

    pub fn is_fallen_back(&self) -> bool {
        self.fallen_back.load(Ordering::Relaxed)
    }

    /// Current date-time. Never fails.
    pub fn current(&self) -> DateTime {
        if !self.is_fallen_back()
            && let Some(primary) = &self.primary
        {
            match primary.now() {
                Ok(dt) => return dt,
                Err(e) => {
                    self.fallen_back.store(true, Ordering::Relaxed);
                    tracing::warn!(
                        error = %e,
                        epoch_now = %self.synthetic.current(),
                        "wall clock unavailable; using synthetic clock"
                    );
                }
            }
        }
        self.synthetic.current()
    }
}

impl WallClock for FallbackClock {
    fn now(&self) -> Result<DateTime, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.current())
    }
}
