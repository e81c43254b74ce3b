use scribe_relay_core::{DispatchError, RegistryError};

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the scribe-relay host.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// A command invoked from the console failed.
    #[error("Dispatch error: {source} {location}")]
    Dispatch {
        /// The underlying dispatch error.
        #[source]
        source: DispatchError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A context's command table could not be assembled.
    #[error("Command registration failed: {source} {location}")]
    Registry {
        /// The underlying registration error.
        #[source]
        source: RegistryError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Audio device could not be opened or driven.
    #[error("Audio device error: {reason} {location}")]
    AudioDevice {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Console input could not be understood.
    #[error("Invalid console command: {input} {location}")]
    InvalidConsoleCommand {
        /// The line that was entered.
        input: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<DispatchError> for AppError {
    #[track_caller]
    fn from(source: DispatchError) -> Self {
        AppError::Dispatch {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<RegistryError> for AppError {
    #[track_caller]
    fn from(source: RegistryError) -> Self {
        AppError::Registry {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
