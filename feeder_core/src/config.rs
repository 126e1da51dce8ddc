//! Configuration types for the feeder core.
//!
//! These are the runtime configuration structs used by the state machines.
//! They are separate from the TOML-deserialized config in `feeder_config`.

/// Feeding session safety nets and notifications.
#[derive(Debug, Clone)]
pub struct FeedingCfg {
    /// Smallest weight rise (g) counted as progress; rejects sensor noise.
    pub min_increase_g: f32,
    /// Finish as stuck when no progress was seen for longer than this (ms).
    pub stuck_ms: u64,
    /// Absolute ceiling on a session's runtime (ms).
    pub max_run_ms: u64,
    /// Interval between progress notifications (ms). 0 disables them.
    pub progress_ms: u64,
    /// How long the completion message stays up (ms).
    pub done_message_ms: u64,
}

impl Default for FeedingCfg {
    fn default() -> Self {
        Self {
            min_increase_g: 3.0,
            stuck_ms: 20_000,
            max_run_ms: 60_000,
            progress_ms: 2_000,
            done_message_ms: 3_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerCfg {
    /// Seconds at the start of a minute during which a slot may fire.
    pub trigger_window_s: u8,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self {
            trigger_window_s: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputCfg {
    /// Presses closer than this to the previous accepted press are ignored.
    pub debounce_ms: u64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

/// Manual amount selection.
#[derive(Debug, Clone)]
pub struct ManualCfg {
    pub default_g: f32,
    pub step_g: f32,
    pub max_g: f32,
}

impl Default for ManualCfg {
    fn default() -> Self {
        Self {
            default_g: 100.0,
            step_g: 10.0,
            max_g: 5000.0,
        }
    }
}

/// Slot editor weight field.
#[derive(Debug, Clone)]
pub struct SettingsCfg {
    pub weight_step_g: f32,
    pub weight_max_g: f32,
}

impl Default for SettingsCfg {
    fn default() -> Self {
        Self {
            weight_step_g: 100.0,
            weight_max_g: 9999.0,
        }
    }
}

/// Everything the app aggregate needs, bundled.
#[derive(Debug, Clone)]
pub struct CoreCfg {
    pub feeding: FeedingCfg,
    pub scheduler: SchedulerCfg,
    pub input: InputCfg,
    pub manual: ManualCfg,
    pub settings: SettingsCfg,
    /// Feed log ring capacity.
    pub history_capacity: usize,
}

impl Default for CoreCfg {
    fn default() -> Self {
        Self {
            feeding: FeedingCfg::default(),
            scheduler: SchedulerCfg::default(),
            input: InputCfg::default(),
            manual: ManualCfg::default(),
            settings: SettingsCfg::default(),
            history_capacity: 10,
        }
    }
}
