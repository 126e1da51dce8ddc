#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! `feeder` command-line entry point.

mod backend;
mod cli;
mod error_fmt;
mod feed;
mod run;
mod simulate;

use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use feeder_hardware::SystemWallClock;
use serde_json::json;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::backend::{ClockMode, build_rig};
use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    // Must run while the process is still single-threaded.
    let host = SystemWallClock::new();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli, host) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        tracing::debug!(error = ?err, "command failed");
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli, host: SystemWallClock) -> Result<()> {
    let _ = color_eyre::install();
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    match cli.cmd {
        Commands::Feed { grams } => {
            let mode = feed::feed_mode(&cfg, host)?;
            let entry = feed::run_feed(&cfg, mode, grams)?;
            if cli.json {
                println!("{}", json!({ "event": "feed", "entry": feed::entry_json(&entry) }));
            } else {
                println!(
                    "feed complete: +{:.1} g -> {:.1} g (target {:.1} g)",
                    entry.dispensed_g(),
                    entry.final_g,
                    entry.target_g
                );
            }
        }
        Commands::Simulate { start, minutes } => {
            simulate::run_simulation(&cfg, &start, minutes, cli.json)?;
        }
        Commands::Run => run::run_loop(&cfg, host, cli.json)?,
        Commands::Schedule => print_schedule(&cfg, cli.json),
        Commands::SelfCheck => {
            let mut rig = build_rig(&cfg, ClockMode::RealTime(host))?;
            let weight = rig.app.refresh_weight().wrap_err("read weight")?;
            rig.app.shutdown();
            if cli.json {
                println!("{}", json!({ "ok": true, "backend": rig.backend, "weight_g": weight }));
            } else {
                println!("ok: backend={} weight={weight:.1} g", rig.backend);
            }
        }
        Commands::Health => {
            let mut rig = build_rig(&cfg, ClockMode::RealTime(host))?;
            let now = rig.wall.current();
            let clock = if rig.wall.is_fallen_back() { "synthetic" } else { "system" };
            let weight = rig.app.refresh_weight();
            rig.app.shutdown();
            let status = if weight.is_ok() { "ok" } else { "degraded" };
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "status": status,
                        "backend": rig.backend,
                        "clock": clock,
                        "time": now.to_string(),
                        "weight_g": weight.as_ref().ok(),
                        "error": weight.as_ref().err().map(ToString::to_string),
                    })
                );
            } else {
                println!("status={status} backend={} clock={clock} time={now}", rig.backend);
                match &weight {
                    Ok(w) => println!("weight={w:.1} g"),
                    Err(e) => println!("scale error: {e}"),
                }
            }
            weight.wrap_err("scale unhealthy")?;
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<feeder_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = feeder_config::load_toml(&text).wrap_err("invalid configuration")?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn init_tracing(json: bool, cli_level: Option<&str>, logging: &feeder_config::Logging) -> Result<()> {
    // RUST_LOG > --log-level > [logging].level > info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = cli_level.or(logging.level.as_deref()).unwrap_or("info");
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().with_target(false).with_writer(std::io::stderr).boxed());
    }

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            "never" => tracing_appender::rolling::never(dir, name),
            other => eyre::bail!("logging.rotation {other:?}: expected never|daily|hourly"),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}

fn print_schedule(cfg: &feeder_config::Config, json: bool) {
    let slots = feeder_core::default_slots(&cfg.slots);
    if json {
        let rows: Vec<_> = slots
            .iter()
            .enumerate()
            .map(|(i, s)| {
                json!({
                    "slot": i,
                    "enabled": s.enabled,
                    "time": format!("{:02}:{:02}", s.hour, s.minute),
                    "add_g": s.add_g,
                })
            })
            .collect();
        println!("{}", json!({ "slots": rows }));
    } else {
        for (i, s) in slots.iter().enumerate() {
            println!(
                "slot {}  {:02}:{:02}  {:>6.0} g  {}",
                i + 1,
                s.hour,
                s.minute,
                s.add_g,
                if s.is_active() { "ON" } else { "OFF" }
            );
        }
    }
}
