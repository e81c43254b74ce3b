use crate::{Destination, ExecutionContext};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a command's native handler.
///
/// Travels back to the caller inside a reply, so it is serializable and
/// carries no source location of its own.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommandError {
    /// A required setting (the credential) is missing.
    #[error("Configuration required: {reason}")]
    Configuration {
        /// What is missing.
        reason: String,
    },

    /// Audio capture or device enumeration failed.
    #[error("Capture failed: {reason}")]
    Capture {
        /// Description from the capture collaborator.
        reason: String,
    },

    /// Reading or writing the persisted settings document failed.
    #[error("Settings storage failed: {reason}")]
    Storage {
        /// Description from the storage collaborator.
        reason: String,
    },

    /// There is no active tab to address.
    #[error("No active tab")]
    NoActiveTab,

    /// A page-management call on the host platform failed.
    #[error("Host platform call failed: {reason}")]
    Host {
        /// Description from the host.
        reason: String,
    },

    /// The notification collaborator could not show a message.
    #[error("Notification failed: {reason}")]
    Notification {
        /// Description from the notifier.
        reason: String,
    },

    /// Arguments or output could not be (de)serialized.
    #[error("Malformed payload for {command}: {reason}")]
    Encoding {
        /// Command whose payload was malformed.
        command: String,
        /// Serializer message.
        reason: String,
    },

    /// The envelope reached a context that does not run this command.
    #[error("Command {command} is not handled in the {context} context")]
    UnknownCommand {
        /// Command named in the envelope.
        command: String,
        /// Context that received it.
        context: ExecutionContext,
    },

    /// A handler's own outbound dispatch failed before reaching a native handler.
    #[error("Nested dispatch failed: {reason}")]
    Dispatch {
        /// Rendered dispatch error.
        reason: String,
    },
}

/// Errors surfaced by [`CommandTable::invoke`](crate::CommandTable::invoke).
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No shim is defined for the calling context, or the command is unknown.
    #[error("No route for {command} from the {caller} context {location}")]
    Routing {
        /// Command being invoked.
        command: String,
        /// Context the call originated in.
        caller: ExecutionContext,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The send/await round trip failed or the peer is unreachable.
    #[error("Transport failed for {command}: {reason} {location}")]
    Transport {
        /// Command being invoked.
        command: String,
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The native handler returned a domain error.
    #[error("{command} failed: {source} {location}")]
    Remote {
        /// Command being invoked.
        command: String,
        /// The handler's error, unmodified.
        #[source]
        source: CommandError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The application page could not be discovered or created.
    #[error("Peer locator failed: {reason} {location}")]
    PeerLocator {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl DispatchError {
    #[track_caller]
    pub(crate) fn routing(command: &str, caller: ExecutionContext) -> Self {
        DispatchError::Routing {
            command: command.to_string(),
            caller,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn transport(command: &str, reason: impl Into<String>) -> Self {
        DispatchError::Transport {
            command: command.to_string(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn remote(command: &str, source: CommandError) -> Self {
        DispatchError::Remote {
            command: command.to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn peer_locator(reason: impl Into<String>) -> Self {
        DispatchError::PeerLocator {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// The native handler's error, when the failure came from one.
    pub fn remote_cause(&self) -> Option<&CommandError> {
        match self {
            DispatchError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the call was rejected for missing configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self.remote_cause(), Some(CommandError::Configuration { .. }))
    }
}

// A handler that invokes another command hands domain errors back unchanged.
impl From<DispatchError> for CommandError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Remote { source, .. } => source,
            other => CommandError::Dispatch {
                reason: other.to_string(),
            },
        }
    }
}

/// Misconfiguration detected while building a [`CommandTable`](crate::CommandTable)
/// or attaching it to a bus.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The handler's command is native to a different context.
    #[error("{command} is native to {native}, not {context} {location}")]
    WrongContext {
        /// Command being registered.
        command: String,
        /// The command's native context.
        native: ExecutionContext,
        /// The table's context.
        context: ExecutionContext,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A handler for the command is already registered.
    #[error("Handler for {command} is already registered {location}")]
    AlreadyRegistered {
        /// Command being registered.
        command: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The command has no catalog entry.
    #[error("{command} is not in the command catalog {location}")]
    NotInCatalog {
        /// Command being registered.
        command: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A table was attached at an address meant for another context.
    #[error("Cannot serve {context} at {destination} {location}")]
    MisplacedTable {
        /// Where the table was to be attached.
        destination: Destination,
        /// The table's context.
        context: ExecutionContext,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

/// Result type alias using [`DispatchError`].
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Result type alias for native handlers.
pub type CommandResult<T> = std::result::Result<T, CommandError>;
