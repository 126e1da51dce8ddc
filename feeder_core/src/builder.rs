//! Builder for [`FeederApp`].
//!
//! Sensor and gate are required; everything else falls back to defaults.
//! `build()` validates the assembled configuration before constructing.

use std::sync::Arc;

use feeder_traits::clock::{Clock, MonotonicClock};
use feeder_traits::{Gate, WeightSensor};

use crate::app::FeederApp;
use crate::config::CoreCfg;
use crate::error::{BuildError, Result};
use crate::schedule::{DEFAULT_SLOTS, SLOT_COUNT, ScheduleSlot};

pub struct FeederBuilder<S, G> {
    sensor: Option<S>,
    gate: Option<G>,
    cfg: Option<CoreCfg>,
    slots: Option<[ScheduleSlot; SLOT_COUNT]>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl<S, G> Default for FeederBuilder<S, G> {
    fn default() -> Self {
        Self {
            sensor: None,
            gate: None,
            cfg: None,
            slots: None,
            clock: None,
        }
    }
}

impl<S: WeightSensor, G: Gate> FeederBuilder<S, G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor(mut self, sensor: S) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn with_gate(mut self, gate: G) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_cfg(mut self, cfg: CoreCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    /// Schedule defaults; restored on every reset.
    pub fn with_slots(mut self, slots: [ScheduleSlot; SLOT_COUNT]) -> Self {
        self.slots = Some(slots);
        self
    }

    /// Inject a custom monotonic clock (tests use `TestClock`).
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<FeederApp<S, G>> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let gate = self
            .gate
            .ok_or_else(|| eyre::Report::new(BuildError::MissingGate))?;
        let cfg = self.cfg.unwrap_or_default();
        let slots = self.slots.unwrap_or(DEFAULT_SLOTS);
        validate(&cfg, &slots)?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()) as Arc<dyn Clock + Send + Sync>);
        Ok(FeederApp::new(sensor, gate, cfg, slots, clock))
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(cfg: &CoreCfg, slots: &[ScheduleSlot; SLOT_COUNT]) -> Result<()> {
    let f = &cfg.feeding;
    if !(f.min_increase_g.is_finite() && f.min_increase_g > 0.0) {
        return Err(invalid("min_increase_g must be > 0"));
    }
    if f.stuck_ms == 0 || f.max_run_ms == 0 {
        return Err(invalid("stuck_ms and max_run_ms must be >= 1"));
    }
    if cfg.scheduler.trigger_window_s == 0 || cfg.scheduler.trigger_window_s > 59 {
        return Err(invalid("trigger_window_s must be in 1..=59"));
    }
    let m = &cfg.manual;
    if !(m.step_g > 0.0 && m.max_g >= 0.0 && (0.0..=m.max_g).contains(&m.default_g)) {
        return Err(invalid("manual amounts must satisfy 0 <= default_g <= max_g, step_g > 0"));
    }
    if !(cfg.settings.weight_step_g > 0.0 && cfg.settings.weight_max_g >= 0.0) {
        return Err(invalid("settings weight step must be > 0"));
    }
    if cfg.history_capacity == 0 {
        return Err(invalid("history capacity must be >= 1"));
    }
    for s in slots {
        if s.hour > 23 || s.minute > 59 {
            return Err(invalid("slot time out of range"));
        }
        if !(s.add_g.is_finite() && s.add_g >= 0.0) {
            return Err(invalid("slot add_g must be >= 0"));
        }
    }
    Ok(())
}
