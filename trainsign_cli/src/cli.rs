//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Worker guard of the file sink. Dropping it flushes buffered lines, so it
/// is taken out before any `process::exit`.
pub static FILE_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub const DEFAULT_CONFIG: &str = "etc/trainsign.toml";

#[derive(Parser, Debug)]
#[command(name = "trainsign", version, about = "Subway arrival sign")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins if set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Use the generated feed and an always-up link instead of the network
    #[arg(long, action = ArgAction::SetTrue)]
    pub simulate: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the sign until Ctrl-C or a device reset
    Run {
        /// Line to show first (defaults to config default_line)
        #[arg(long, value_name = "ID")]
        line: Option<String>,
        /// Stop after this many loop iterations
        #[arg(long, value_name = "N")]
        max_iterations: Option<u64>,
    },
    /// Fetch once and print both arrival rows
    Once {
        #[arg(long, value_name = "ID")]
        line: Option<String>,
    },
    /// List the configured lines
    Lines,
    /// Validate config, credentials and connectivity
    SelfCheck,
}
