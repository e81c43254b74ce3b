use crate::AppError;

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Commands typed at the relay console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start or stop recording in the active tab.
    Toggle,
    /// Abort the recording in the active tab.
    Cancel,
    /// Print the current settings document.
    ShowSettings,
    /// Store a transcription credential.
    SetApiKey {
        /// The credential; empty clears it.
        key: String,
    },
    /// Select the input device.
    SelectDevice {
        /// Device id as listed by the host.
        device_id: String,
    },
    /// Enable or disable transition cues.
    Sound {
        /// Whether cues play.
        enabled: bool,
    },
    /// Print the available commands.
    Help,
    /// Request application shutdown.
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (verb, rest) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input, ""),
        };

        let command = match (verb.to_ascii_lowercase().as_str(), rest) {
            ("toggle" | "t", "") => ConsoleCommand::Toggle,
            ("cancel" | "c", "") => ConsoleCommand::Cancel,
            ("settings" | "s", "") => ConsoleCommand::ShowSettings,
            ("key", key) => ConsoleCommand::SetApiKey {
                key: key.to_string(),
            },
            ("device", device_id) if !device_id.is_empty() => ConsoleCommand::SelectDevice {
                device_id: device_id.to_string(),
            },
            ("sound", "on") => ConsoleCommand::Sound { enabled: true },
            ("sound", "off") => ConsoleCommand::Sound { enabled: false },
            ("help" | "?", "") => ConsoleCommand::Help,
            ("quit" | "exit" | "q", "") => ConsoleCommand::Quit,
            _ => {
                return Err(AppError::InvalidConsoleCommand {
                    input: input.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(command)
    }
}

/// Usage text printed by `help`.
pub(crate) const CONSOLE_HELP: &str = "\
commands:
  toggle | t          start or stop recording in the active tab
  cancel | c          abort the current recording
  settings | s        show the settings document
  key <api key>       store the transcription credential (empty clears it)
  device <id>         select the input device
  sound on|off        enable or disable cues
  help | ?            show this text
  quit | q            exit";
