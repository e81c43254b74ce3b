//! The persisted settings document.
//!
//! Reads fall back to [`Settings::default`] when nothing is stored or the
//! stored document does not parse. Writes replace the whole document, so
//! concurrent writers resolve last-write-wins.

use crate::{Command, CommandError, CommandResult, SetSettings, SettingsStore};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

pub(crate) const DEFAULT_DEVICE_ID: &str = "default";
pub(crate) const DEFAULT_LOCAL_SHORTCUT: &str = "Ctrl+Shift+Space";
pub(crate) const DEFAULT_GLOBAL_SHORTCUT: &str = "Alt+Shift+Space";
pub(crate) const DEFAULT_OUTPUT_LANGUAGE: &str = "en";

/// User settings shared by every context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Play cues on start, stop and cancel.
    pub sound_on_toggle: bool,
    /// Copy finished transcriptions to the clipboard.
    pub copy_to_clipboard: bool,
    /// Paste finished transcriptions into the focused field.
    pub paste_on_success: bool,
    /// Input device to capture from.
    pub selected_device_id: String,
    /// Shortcut active inside pages.
    pub local_shortcut: String,
    /// Shortcut registered with the host.
    pub global_shortcut: String,
    /// Transcription service credential; empty when unset.
    pub api_key: String,
    /// Language transcriptions are produced in.
    pub output_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_on_toggle: true,
            copy_to_clipboard: true,
            paste_on_success: false,
            selected_device_id: DEFAULT_DEVICE_ID.to_string(),
            local_shortcut: DEFAULT_LOCAL_SHORTCUT.to_string(),
            global_shortcut: DEFAULT_GLOBAL_SHORTCUT.to_string(),
            api_key: String::new(),
            output_language: DEFAULT_OUTPUT_LANGUAGE.to_string(),
        }
    }
}

impl Settings {
    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[instrument(skip(store))]
pub(crate) async fn load(store: &dyn SettingsStore) -> CommandResult<Settings> {
    let stored = store.load().await.map_err(|e| CommandError::Storage {
        reason: e.to_string(),
    })?;

    let Some(document) = stored else {
        debug!("No settings stored, using defaults");
        return Ok(Settings::default());
    };

    match serde_json::from_str(&document) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!(error = %e, "Stored settings are corrupt, using defaults");
            Ok(Settings::default())
        }
    }
}

#[instrument(skip(store, settings))]
pub(crate) async fn save(store: &dyn SettingsStore, settings: &Settings) -> CommandResult<()> {
    let document = serde_json::to_string(settings).map_err(|e| CommandError::Encoding {
        command: SetSettings::NAME.to_string(),
        reason: e.to_string(),
    })?;

    store.save(document).await.map_err(|e| CommandError::Storage {
        reason: e.to_string(),
    })?;

    debug!("Settings saved");

    Ok(())
}
