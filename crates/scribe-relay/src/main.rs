//! Scribe-Relay: runs the background, injected and application page contexts
//! in one process, connected only through the in-process message bus.

mod app;
mod browser;
mod capture;
mod config;
mod console_command;
mod desktop_notifier;
mod error;
mod feedback;
mod logging;
mod settings_file;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    browser::{ApplicationPageSeed, Browser},
    capture::{CpalCapture, CpalInputs},
    console_command::ConsoleCommand,
    desktop_notifier::DesktopNotifier,
    error::{AppError, Result as AppResult},
    feedback::ToneFeedback,
    settings_file::FileSettingsStore,
};

use crate::config::Config;

use tracing::error;

/// Application entry point.
fn main() {
    // Logging is configured from the config file, so config errors go to stderr.
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // Dropping the guard flushes buffered file logs; keep it for the whole run.
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e}");
            std::process::exit(1);
        }
    };

    let settings_path = match Config::settings_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to resolve settings path: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let app = match App::start(&config, settings_path) {
            Ok(app) => app,
            Err(e) => {
                error!("Failed to start execution contexts: {:?}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = app.run().await {
            error!(error = ?e, "App error");
        }
    });
}
