//! Logging Setup
//!
//! stderr output filtered by `RUST_LOG` (default `info`), plus an optional
//! daily-rolling file in the data directory.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt, registry};

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use crate::helpers::{get_or_create_data_dir, is_development};

fn build_filter() -> EnvFilter {
    let level = if is_development() { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer and must live until exit.
pub fn init_logging(to_file: bool) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = if to_file {
        let log_dir = get_or_create_data_dir()?.join("logs");
        std::fs::create_dir_all(&log_dir)?;
        let appender = tracing_appender::rolling::daily(&log_dir, format!("{APP_NAME}.log"));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    registry()
        .with(build_filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Invalid {
            message: format!("Logging already initialized: {e}"),
        })?;

    tracing::debug!(to_file, "Logging initialized");
    Ok(guard)
}
