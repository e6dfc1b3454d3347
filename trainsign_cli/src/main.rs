#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod cli;
mod error_fmt;
mod logging;
mod sign;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use trainsign_core::SignError;

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

/// A missing file at the default path means "use built-in defaults"; an
/// explicit path must exist.
fn load_config(path: &Path) -> eyre::Result<trainsign_config::Config> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG) {
        return Ok(trainsign_config::Config::default());
    }
    trainsign_config::load_file(path).map_err(|e| SignError::Config(format!("{e:#}")).into())
}

fn dispatch(cli: &Cli, cfg: &trainsign_config::Config) -> eyre::Result<()> {
    match &cli.cmd {
        Commands::Run {
            line,
            max_iterations,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            sign::run_sign(cfg, cli.simulate, line.as_deref(), *max_iterations, shutdown)
        }
        Commands::Once { line } => sign::run_once(cfg, cli.simulate, line.as_deref(), cli.json),
        Commands::Lines => sign::list_lines(cfg, cli.json),
        Commands::SelfCheck => sign::self_check(cfg, cli.simulate, cli.json),
    }
}

fn report(err: &eyre::Report) -> i32 {
    tracing::error!(error = %err, "command failed");
    if JSON_MODE.get().copied().unwrap_or(false) {
        eprintln!("{}", format_error_json(err));
    } else {
        eprintln!("{}", humanize(err));
    }
    exit_code_for_error(err)
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = load_config(&cli.config);
    let logging = cfg
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    if let Err(e) = logging::init_tracing(cli.json, cli.log_level.as_deref(), &logging) {
        eprintln!("warning: logging disabled: {e:#}");
    }

    let code = match cfg.and_then(|cfg| {
        tracing::debug!(config = %cli.config.display(), simulate = cli.simulate, "starting");
        dispatch(&cli, &cfg)
    }) {
        Ok(()) => 0,
        Err(e) => report(&e),
    };
    logging::flush();
    std::process::exit(code);
}
