use std::path::Path;
use std::sync::Once;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

pub const LOG_FILE_PREFIX: &str = "notibridge.log";

/// Overrides `RUST_LOG` when set
pub const LOG_FILTER_ENV: &str = "NOTIBRIDGE_LOG";

const DEFAULT_FILTER: &str = "info";

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber: colored stdout plus a daily file under `log_dir`.
///
/// Only the first call installs anything. Later calls still make sure the
/// directory exists and return `Ok`.
pub fn init_logger(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|error| format!("Failed to create log directory {:?}: {}", log_dir, error))?;

    INIT.call_once(|| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        // Flushing stops when the guard drops
        Box::leak(Box::new(guard));

        let subscriber = tracing_subscriber::registry()
            .with(build_filter())
            .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true),
            );

        if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to set global default subscriber: {}", error);
        }

        tracing::debug!("Logger initialized in {:?}", log_dir);
    });

    Ok(())
}

pub fn debug(message: &str) {
    tracing::debug!("{}", message);
}

pub fn info(message: &str) {
    tracing::info!("{}", message);
}

pub fn warn(message: &str) {
    tracing::warn!("{}", message);
}
