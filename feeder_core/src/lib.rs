#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Pet feeder control core (hardware-agnostic).
//!
//! All hardware interactions go through `feeder_traits::WeightSensor`,
//! `feeder_traits::Gate` and `feeder_traits::WallClock`.
//!
//! ## Architecture
//!
//! - **Schedule**: three time-of-day slots (`schedule`)
//! - **Scheduler**: minute-granular trigger with trigger memory (`scheduler`)
//! - **Feeding**: open gate → monitor → stop on target/stuck/timeout (`feeding`)
//! - **Editors**: slot settings and manual amount selection (`settings`, `manual`)
//! - **History**: newest-first feed log ring (`history`)
//! - **App**: the owned aggregate driven by `FeederApp::tick` (`app`)
//!
//! Everything runs on one cooperative tick; no state is shared across threads.
//! Weights are grams (`f32`), always taken as absolute values.

pub mod app;
pub mod builder;
pub mod clock;
pub mod config;
pub mod conversions;
pub mod error;
pub mod feeding;
pub mod history;
pub mod hw_error;
pub mod input;
pub mod manual;
pub mod mocks;
pub mod schedule;
pub mod scheduler;
pub mod settings;
pub mod status;
pub mod util;

pub use app::{FeederApp, SessionView, Snapshot, TickReport, View};
pub use builder::FeederBuilder;
pub use clock::FallbackClock;
pub use config::{CoreCfg, FeedingCfg, InputCfg, ManualCfg, SchedulerCfg, SettingsCfg};
pub use conversions::default_slots;
pub use error::{BuildError, FeederError, Report, Result};
pub use feeding::{Feeder, FeedingSession};
pub use history::{FeedLog, FeedLogEntry};
pub use input::{Adjust, Button, ButtonLevels, Debouncer};
pub use manual::{ManualSetup, ManualState};
pub use schedule::{DEFAULT_SLOTS, SLOT_COUNT, ScheduleSlot, ScheduleStore};
pub use scheduler::{MinuteStamp, Scheduler, TriggerMemory};
pub use settings::{EditBuffer, SettingsMachine, SettingsState};
pub use status::{FeedStatus, FinishReason, Origin};
