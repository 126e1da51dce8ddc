//! `From` implementations bridging `feeder_config` types to `feeder_core` types.

use crate::config::{CoreCfg, FeedingCfg, InputCfg, ManualCfg, SchedulerCfg, SettingsCfg};
use crate::schedule::{DEFAULT_SLOTS, SLOT_COUNT, ScheduleSlot};

// ── FeedingCfg ───────────────────────────────────────────────────────────────

impl From<&feeder_config::FeedingCfg> for FeedingCfg {
    fn from(c: &feeder_config::FeedingCfg) -> Self {
        Self {
            min_increase_g: c.min_increase_g,
            stuck_ms: c.stuck_ms,
            max_run_ms: c.max_run_ms,
            progress_ms: c.progress_ms,
            done_message_ms: c.done_message_ms,
        }
    }
}

// ── SchedulerCfg / InputCfg ──────────────────────────────────────────────────

impl From<&feeder_config::SchedulerCfg> for SchedulerCfg {
    fn from(c: &feeder_config::SchedulerCfg) -> Self {
        Self {
            trigger_window_s: c.trigger_window_s,
        }
    }
}

impl From<&feeder_config::InputCfg> for InputCfg {
    fn from(c: &feeder_config::InputCfg) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
        }
    }
}

// ── Editors ──────────────────────────────────────────────────────────────────

impl From<&feeder_config::ManualCfg> for ManualCfg {
    fn from(c: &feeder_config::ManualCfg) -> Self {
        Self {
            default_g: c.default_g,
            step_g: c.step_g,
            max_g: c.max_g,
        }
    }
}

impl From<&feeder_config::SettingsCfg> for SettingsCfg {
    fn from(c: &feeder_config::SettingsCfg) -> Self {
        Self {
            weight_step_g: c.weight_step_g,
            weight_max_g: c.weight_max_g,
        }
    }
}

// ── Slots ────────────────────────────────────────────────────────────────────

impl From<&feeder_config::SlotCfg> for ScheduleSlot {
    fn from(c: &feeder_config::SlotCfg) -> Self {
        Self {
            enabled: c.enabled && c.add_g > 0.0,
            hour: c.hour,
            minute: c.minute,
            add_g: c.add_g,
        }
    }
}

/// Schedule defaults from `[[slots]]`; missing entries keep the factory slot.
pub fn default_slots(cfg: &[feeder_config::SlotCfg]) -> [ScheduleSlot; SLOT_COUNT] {
    let mut slots = DEFAULT_SLOTS;
    for (dst, src) in slots.iter_mut().zip(cfg) {
        *dst = ScheduleSlot::from(src);
    }
    slots
}

// ── CoreCfg ──────────────────────────────────────────────────────────────────

impl From<&feeder_config::Config> for CoreCfg {
    fn from(c: &feeder_config::Config) -> Self {
        Self {
            feeding: FeedingCfg::from(&c.feeding),
            scheduler: SchedulerCfg::from(&c.scheduler),
            input: InputCfg::from(&c.input),
            manual: ManualCfg::from(&c.manual),
            settings: SettingsCfg::from(&c.settings),
            history_capacity: c.history.capacity,
        }
    }
}
