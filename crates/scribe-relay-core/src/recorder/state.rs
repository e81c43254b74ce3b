use crate::StateStore;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Recorder state persisted in the injected context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecorderState {
    /// Not capturing.
    Idle,
    /// Capturing audio.
    Recording,
}

impl RecorderState {
    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            RecorderState::Idle => "IDLE",
            RecorderState::Recording => "RECORDING",
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the state store actually held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredState {
    /// A recognised state.
    Valid(RecorderState),
    /// Anything else; observed, logged, never acted on.
    Invalid(String),
}

impl StoredState {
    /// Interpret a raw stored value.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "IDLE" => StoredState::Valid(RecorderState::Idle),
            "RECORDING" => StoredState::Valid(RecorderState::Recording),
            other => StoredState::Invalid(other.to_string()),
        }
    }

    pub(crate) fn read(store: &dyn StateStore) -> Self {
        Self::parse(&store.read())
    }
}

impl fmt::Display for StoredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredState::Valid(state) => state.fmt(f),
            StoredState::Invalid(raw) => write!(f, "invalid({raw})"),
        }
    }
}

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transition {
    /// `IDLE -> RECORDING`.
    Started,
    /// `RECORDING -> IDLE`.
    Stopped,
    /// The stored state was invalid; nothing changed.
    Ignored,
}
