//! One-shot manual feed and the shared formatting of feed outcomes.

use feeder_core::{FeedLogEntry, FinishReason, Origin, Result};
use serde_json::json;

use crate::backend::{ClockMode, Rig, build_rig};

/// A feed that ended by a safety net instead of reaching its target.
#[derive(Debug, thiserror::Error)]
#[error(
    "feed stopped ({}) at {:.1} g of {:.1} g target",
    .entry.reason.as_str(),
    .entry.final_g,
    .entry.target_g
)]
pub struct FeedIncomplete {
    pub entry: FeedLogEntry,
    /// The limit that tripped: stuck window or runtime ceiling (ms).
    pub limit_ms: u64,
}

pub fn origin_name(o: Origin) -> String {
    match o {
        Origin::Manual => "manual".to_string(),
        Origin::Scheduled(i) => format!("slot{i}"),
    }
}

pub fn entry_json(e: &FeedLogEntry) -> serde_json::Value {
    json!({
        "origin": origin_name(e.origin()),
        "slot_index": e.slot_index,
        "time": format!("{:02}:{:02}", e.hour, e.minute),
        "reason": e.reason.as_str(),
        "start_g": e.start_g,
        "target_g": e.target_g,
        "final_g": e.final_g,
        "dispensed_g": e.dispensed_g(),
    })
}

pub fn entry_line(e: &FeedLogEntry) -> String {
    format!(
        "{:02}:{:02} {:<7} {:<13} +{:.1} g -> {:.1} g (target {:.1} g)",
        e.hour,
        e.minute,
        origin_name(e.origin()),
        e.reason.as_str(),
        e.dispensed_g(),
        e.final_g,
        e.target_g
    )
}

/// Clock mode for a one-shot feed: real time on hardware, stepped in simulation.
pub fn feed_mode(cfg: &feeder_config::Config, host: feeder_hardware::SystemWallClock) -> Result<ClockMode> {
    if cfg!(feature = "hardware") {
        Ok(ClockMode::RealTime(host))
    } else {
        Ok(ClockMode::Stepped {
            epoch: cfg.clock.fallback_epoch()?,
        })
    }
}

/// Dispense `grams` on top of the current bowl weight and wait for the outcome.
pub fn run_feed(cfg: &feeder_config::Config, mode: ClockMode, grams: f32) -> Result<FeedLogEntry> {
    if !(0.0..=cfg.manual.max_g).contains(&grams) {
        eyre::bail!("--grams must be in [0, {}] (manual.max_g)", cfg.manual.max_g);
    }
    let mut rig = build_rig(cfg, mode)?;
    let outcome = drive(&mut rig, cfg, grams);
    rig.app.shutdown();
    outcome
}

fn drive(rig: &mut Rig, cfg: &feeder_config::Config, grams: f32) -> Result<FeedLogEntry> {
    if !rig.app.start_manual_feed(grams)? {
        eyre::bail!("feeder busy; manual feed not started");
    }
    let target_g = rig.app.feeder().session().map(|s| s.target_g);
    tracing::info!(
        grams,
        target_g,
        backend = rig.backend,
        "feed start"
    );

    let tick = Rig::tick_len(cfg);
    loop {
        rig.clock.sleep(tick);
        let now = rig.wall.current();
        let report = rig.app.tick(&now, (rig.buttons)())?;
        let Some(entry) = report.finished else {
            continue;
        };
        return match entry.reason {
            FinishReason::TargetReached => Ok(entry),
            FinishReason::Stuck => Err(FeedIncomplete {
                entry,
                limit_ms: cfg.feeding.stuck_ms,
            }
            .into()),
            FinishReason::Timeout => Err(FeedIncomplete {
                entry,
                limit_ms: cfg.feeding.max_run_ms,
            }
            .into()),
        };
    }
}
