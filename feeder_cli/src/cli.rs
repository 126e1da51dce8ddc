//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "feeder", version, about = "Pet feeder controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/feeder_config.toml")]
    pub config: PathBuf,

    /// Print results and errors as JSON lines; console logs become JSON too
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace). RUST_LOG wins if set.
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one manual feed to completion and report the outcome
    Feed {
        /// Grams to add on top of what is already in the bowl
        #[arg(long)]
        grams: f32,
    },
    /// Run the full controller on a simulated clock (no sleeping)
    Simulate {
        /// Wall-clock time to start at, HH:MM:SS (date from [clock].fallback_epoch)
        #[arg(long, value_name = "HH:MM:SS", default_value = "07:59:00")]
        start: String,
        /// Simulated minutes to run
        #[arg(long, default_value_t = 5)]
        minutes: u32,
    },
    /// Real-time poll loop; stops on Ctrl-C with the gate closed
    Run,
    /// Print the configured schedule slots
    Schedule,
    /// Quick check that the configured backend can be assembled and read
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}
