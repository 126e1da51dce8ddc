//! Real-time control loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use feeder_core::Result;
use feeder_hardware::SystemWallClock;
use serde_json::json;

use crate::backend::{ClockMode, Rig, build_rig};
use crate::feed::{entry_json, entry_line, origin_name};

/// Poll buttons, scheduler and session every tick until Ctrl-C, then close
/// the gate.
pub fn run_loop(cfg: &feeder_config::Config, host: SystemWallClock, json: bool) -> Result<()> {
    // Assemble before the signal thread exists; see SystemWallClock::new.
    let mut rig = build_rig(cfg, ClockMode::RealTime(host))?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }
    tracing::info!(
        backend = rig.backend,
        tick_ms = cfg.runner.tick_ms,
        wall_fallback = rig.wall.is_fallen_back(),
        "control loop start"
    );

    let tick = Rig::tick_len(cfg);
    let mut last_render = rig.clock.now();
    let mut shown: Option<feeder_ui::Screen> = None;

    while !stop.load(Ordering::Relaxed) {
        let now = rig.wall.current();
        let redraw = match rig.app.tick(&now, (rig.buttons)()) {
            Ok(report) => {
                if json {
                    if let Some(origin) = report.started {
                        println!("{}", json!({ "event": "start", "time": now.to_string(), "origin": origin_name(origin) }));
                    }
                    if let Some(e) = &report.finished {
                        println!("{}", json!({ "event": "finish", "time": now.to_string(), "entry": entry_json(e) }));
                    }
                } else if let Some(e) = &report.finished {
                    tracing::info!("{}", entry_line(e));
                }
                report.redraw
            }
            Err(e) => {
                // Sensor or gate trouble; keep polling so the next tick can recover.
                tracing::error!(error = %e, "tick failed");
                false
            }
        };

        if redraw || rig.clock.ms_since(last_render) >= cfg.runner.render_ms {
            last_render = rig.clock.now();
            if !rig.app.is_feeding()
                && let Err(e) = rig.app.refresh_weight()
            {
                tracing::warn!(error = %e, "idle weight read failed");
            }
            let screen = feeder_ui::render(&rig.app.snapshot(&now));
            if !json && shown.as_ref() != Some(&screen) {
                println!("{}\n{}\n", screen[0], screen[1]);
                shown = Some(screen);
            }
        }
        rig.clock.sleep(tick);
    }

    tracing::info!("stop requested");
    rig.app.shutdown();
    Ok(())
}
