//! Tracing setup: console layer (pretty or JSON) plus an optional JSON file sink.

use std::path::Path;

use eyre::{WrapErr, eyre};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::FILE_GUARD;

fn rotation(name: Option<&str>) -> Rotation {
    match name {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    }
}

/// Level precedence: RUST_LOG, then `--log-level`, then `[logging] level`, then info.
pub fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &trainsign_config::Logging,
) -> eyre::Result<()> {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file = match &logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre!("logging.file {path:?} has no file name"))?;
            let appender = RollingFileAppender::builder()
                .rotation(rotation(logging.rotation.as_deref()))
                .filename_prefix(name.to_string_lossy().into_owned())
                .build(dir)
                .wrap_err_with(|| format!("open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if let Ok(mut slot) = FILE_GUARD.lock() {
                *slot = Some(guard);
            }
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| eyre!("init tracing: {e}"))
}

/// Flush and close the file sink. Later events only reach the console.
pub fn flush() {
    if let Ok(mut slot) = FILE_GUARD.lock() {
        drop(slot.take());
    }
}
