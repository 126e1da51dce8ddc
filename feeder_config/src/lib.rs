#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the feeder.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `[[slots]]` carries the factory schedule, which is also what a system
//!   reset restores.
use serde::Deserialize;
use time::PrimitiveDateTime;
use time::macros::format_description;

/// Number of schedule slots the device exposes.
pub const SLOT_COUNT: usize = 3;

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub hx711_dt: u8,
    pub hx711_sck: u8,
    pub servo: u8,
    pub btn_display: u8,
    pub btn_setting: u8,
    pub btn_increase: u8,
    pub btn_decrease: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScaleCfg {
    /// HX711 counts per gram
    pub calibration_factor: f32,
    /// Raw samples averaged per reading
    pub samples: u8,
    /// Max time to wait for HX711 data-ready (DT low) before failing
    pub read_timeout_ms: u64,
    pub tare_on_start: bool,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            calibration_factor: 420.0,
            samples: 5,
            read_timeout_ms: 150,
            tare_on_start: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GateCfg {
    /// Servo angle (degrees) with the chute open
    pub open_angle: u8,
    /// Servo angle (degrees) with the chute closed
    pub closed_angle: u8,
}

impl Default for GateCfg {
    fn default() -> Self {
        Self {
            open_angle: 90,
            closed_angle: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeedingCfg {
    /// Smallest weight rise (g) that counts as progress
    pub min_increase_g: f32,
    /// Close the gate if no progress for this long
    pub stuck_ms: u64,
    /// Absolute ceiling on one feeding session
    pub max_run_ms: u64,
    /// Interval between progress notifications
    pub progress_ms: u64,
    /// How long the completion message stays on screen
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerCfg {
    /// A slot only fires within this many seconds of the start of its minute.
    pub trigger_window_s: u8,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self {
            trigger_window_s: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    pub debounce_ms: u64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
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

#[derive(Debug, Deserialize)]
#[serde(default)]
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryCfg {
    /// Feed log ring capacity
    pub capacity: usize,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SlotCfg {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub hour: u8,
    pub minute: u8,
    #[serde(default)]
    pub add_g: f32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClockCfg {
    /// Start of the free-running clock used when no RTC is available.
    /// Format: "YYYY-MM-DD HH:MM:SS"
    pub fallback_epoch: String,
    /// Try the host/RTC clock before falling back
    pub prefer_system: bool,
}

impl Default for ClockCfg {
    fn default() -> Self {
        Self {
            fallback_epoch: "2025-01-01 00:00:00".to_string(),
            prefer_system: true,
        }
    }
}

impl ClockCfg {
    pub fn fallback_epoch(&self) -> eyre::Result<PrimitiveDateTime> {
        parse_datetime(&self.fallback_epoch)
            .map_err(|e| eyre::eyre!("clock.fallback_epoch {:?}: {}", self.fallback_epoch, e))
    }
}

/// Parse "YYYY-MM-DD HH:MM:SS".
pub fn parse_datetime(s: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(s.trim(), &fmt)
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Control tick period
    pub tick_ms: u64,
    /// Periodic display refresh while idle
    pub render_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            render_ms: 1_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    /// Bowl contents at startup
    pub initial_g: f32,
    /// Flow through the open gate
    pub flow_g_per_s: f32,
    /// Food left in the hopper; None = bottomless
    pub hopper_g: Option<f32>,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            initial_g: 0.0,
            flow_g_per_s: 25.0,
            hopper_g: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub scale: ScaleCfg,
    #[serde(default)]
    pub gate: GateCfg,
    #[serde(default)]
    pub feeding: FeedingCfg,
    #[serde(default)]
    pub scheduler: SchedulerCfg,
    #[serde(default)]
    pub input: InputCfg,
    #[serde(default)]
    pub manual: ManualCfg,
    #[serde(default)]
    pub settings: SettingsCfg,
    #[serde(default)]
    pub history: HistoryCfg,
    /// Factory schedule; missing entries are disabled slots
    #[serde(default)]
    pub slots: Vec<SlotCfg>,
    #[serde(default)]
    pub clock: ClockCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub sim: SimCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn non_negative(x: f32) -> bool {
    x.is_finite() && x >= 0.0
}

fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Scale
        if !self.scale.calibration_factor.is_finite() || self.scale.calibration_factor == 0.0 {
            eyre::bail!("scale.calibration_factor must be finite and non-zero");
        }
        if self.scale.samples == 0 {
            eyre::bail!("scale.samples must be >= 1");
        }
        if self.scale.read_timeout_ms == 0 {
            eyre::bail!("scale.read_timeout_ms must be >= 1");
        }

        // Gate
        if self.gate.open_angle > 180 || self.gate.closed_angle > 180 {
            eyre::bail!("gate angles must be in [0, 180]");
        }

        // Feeding
        if !positive(self.feeding.min_increase_g) {
            eyre::bail!("feeding.min_increase_g must be > 0");
        }
        if self.feeding.stuck_ms == 0 {
            eyre::bail!("feeding.stuck_ms must be >= 1");
        }
        if self.feeding.max_run_ms == 0 {
            eyre::bail!("feeding.max_run_ms must be >= 1");
        }
        if self.feeding.max_run_ms > 60 * 60 * 1000 {
            eyre::bail!("feeding.max_run_ms is unreasonably large (>1h)");
        }
        if self.feeding.done_message_ms > 60 * 1000 {
            eyre::bail!("feeding.done_message_ms is unreasonably large (>60s)");
        }

        // Scheduler
        if !(1..=59).contains(&self.scheduler.trigger_window_s) {
            eyre::bail!("scheduler.trigger_window_s must be in [1, 59]");
        }

        // Input
        if self.input.debounce_ms > 5_000 {
            eyre::bail!("input.debounce_ms is unreasonably large (>5s)");
        }

        // Manual
        if !positive(self.manual.step_g) {
            eyre::bail!("manual.step_g must be > 0");
        }
        if !positive(self.manual.max_g) {
            eyre::bail!("manual.max_g must be > 0");
        }
        if !non_negative(self.manual.default_g) || self.manual.default_g > self.manual.max_g {
            eyre::bail!("manual.default_g must be in [0, manual.max_g]");
        }

        // Settings
        if !positive(self.settings.weight_step_g) {
            eyre::bail!("settings.weight_step_g must be > 0");
        }
        if !positive(self.settings.weight_max_g) {
            eyre::bail!("settings.weight_max_g must be > 0");
        }

        // History
        if self.history.capacity == 0 {
            eyre::bail!("history.capacity must be >= 1");
        }
        if self.history.capacity > 1_000 {
            eyre::bail!("history.capacity is unreasonably large (>1000)");
        }

        // Slots
        if self.slots.len() > SLOT_COUNT {
            eyre::bail!(
                "at most {} [[slots]] entries are supported, got {}",
                SLOT_COUNT,
                self.slots.len()
            );
        }
        for (i, s) in self.slots.iter().enumerate() {
            if s.hour > 23 {
                eyre::bail!("slots[{}].hour must be in [0, 23]", i);
            }
            if s.minute > 59 {
                eyre::bail!("slots[{}].minute must be in [0, 59]", i);
            }
            if !non_negative(s.add_g) || s.add_g > self.settings.weight_max_g {
                eyre::bail!("slots[{}].add_g must be in [0, settings.weight_max_g]", i);
            }
        }

        // Clock
        self.clock.fallback_epoch()?;

        // Runner
        if self.runner.tick_ms == 0 {
            eyre::bail!("runner.tick_ms must be >= 1");
        }
        if self.runner.tick_ms >= u64::from(self.scheduler.trigger_window_s) * 1000 {
            eyre::bail!(
                "runner.tick_ms must be shorter than scheduler.trigger_window_s ({} s)",
                self.scheduler.trigger_window_s
            );
        }
        if self.runner.render_ms == 0 {
            eyre::bail!("runner.render_ms must be >= 1");
        }

        // Simulation
        if !non_negative(self.sim.initial_g) {
            eyre::bail!("sim.initial_g must be >= 0");
        }
        if !non_negative(self.sim.flow_g_per_s) {
            eyre::bail!("sim.flow_g_per_s must be >= 0");
        }
        if let Some(h) = self.sim.hopper_g
            && !non_negative(h)
        {
            eyre::bail!("sim.hopper_g must be >= 0");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}
