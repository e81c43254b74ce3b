//! Tracing subscriber setup.

use crate::{AppResult, config::LoggingConfig};

use std::fs;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "scribe-relay.log";

/// Install the global subscriber.
///
/// Logs go to stderr, and additionally to a daily-rolling file when a log
/// directory is configured. The returned guard flushes the file writer and
/// must be held until shutdown.
pub(crate) fn init(config: &LoggingConfig) -> AppResult<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(directory) = &config.directory {
        info!(directory = ?directory, "File logging enabled");
    }

    Ok(guard)
}
