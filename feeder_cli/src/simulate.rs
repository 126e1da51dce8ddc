//! Accelerated run of the whole controller against the simulated rig.

use feeder_core::{FeedLogEntry, Result, TickReport};
use feeder_traits::DateTime;
use serde_json::json;
use time::Time;
use time::macros::format_description;

use crate::backend::{ClockMode, Rig, build_rig};
use crate::feed::{entry_json, entry_line, origin_name};

pub fn parse_start(s: &str) -> Result<Time> {
    let fmt = format_description!("[hour]:[minute]:[second]");
    Time::parse(s.trim(), &fmt).map_err(|e| eyre::eyre!("--start {s:?}: expected HH:MM:SS ({e})"))
}

/// Tick the controller for `minutes` of simulated time starting at `start`
/// on the fallback epoch's date. Returns the feed log, newest first.
pub fn run_simulation(
    cfg: &feeder_config::Config,
    start: &str,
    minutes: u32,
    json: bool,
) -> Result<Vec<FeedLogEntry>> {
    let epoch = cfg.clock.fallback_epoch()?.replace_time(parse_start(start)?);
    let mut rig = build_rig(cfg, ClockMode::Stepped { epoch })?;
    let tick = Rig::tick_len(cfg);
    let ticks = u64::from(minutes) * 60_000 / cfg.runner.tick_ms;
    tracing::info!(%epoch, minutes, ticks, "simulation start");

    for _ in 0..ticks {
        let now = rig.wall.current();
        let report = rig.app.tick(&now, (rig.buttons)())?;
        print_events(&rig, &now, &report, json);
        rig.clock.sleep(tick);
    }
    rig.app.shutdown();

    let log: Vec<FeedLogEntry> = rig.app.log().iter().copied().collect();
    if json {
        println!("{}", json!({ "event": "log", "entries": log.iter().map(entry_json).collect::<Vec<_>>() }));
    } else {
        println!("feed log ({} entries, newest first):", log.len());
        for e in &log {
            println!("  {}", entry_line(e));
        }
    }
    Ok(log)
}

fn print_events(rig: &Rig, now: &DateTime, report: &TickReport, json: bool) {
    if let Some(origin) = report.started {
        let target_g = rig.app.feeder().session().map_or(0.0, |s| s.target_g);
        if json {
            println!(
                "{}",
                json!({ "event": "start", "time": now.to_string(), "origin": origin_name(origin), "target_g": target_g })
            );
        } else {
            println!("{now} start  {} target {target_g:.1} g", origin_name(origin));
        }
    }
    if let Some(entry) = &report.finished {
        if json {
            println!(
                "{}",
                json!({ "event": "finish", "time": now.to_string(), "entry": entry_json(entry) })
            );
        } else {
            println!("{now} finish {}", entry_line(entry));
        }
    }
}
