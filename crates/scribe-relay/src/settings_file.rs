//! Settings document persisted as a JSON file.
//!
//! Uses the same temp-file-then-rename pattern as the host configuration so
//! a crash mid-write never leaves a truncated document behind.

use scribe_relay_core::{PortFailure, SettingsStore};

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, instrument};

/// [`SettingsStore`] backed by a file on disk.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Store the document at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> Result<Option<String>, PortFailure> {
        match fs::read_to_string(&self.path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file yet");
                Ok(None)
            }
            Err(e) => Err(PortFailure::new(format!("Failed to read settings: {}", e))),
        }
    }

    #[instrument(skip(self, document), fields(path = ?self.path))]
    async fn save(&self, document: String) -> Result<(), PortFailure> {
        let temp_path = self.path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path).await.map_err(|e| {
            PortFailure::new(format!("Failed to create temp settings file: {}", e))
        })?;

        temp_file
            .write_all(document.as_bytes())
            .await
            .map_err(|e| PortFailure::new(format!("Failed to write temp settings file: {}", e)))?;

        temp_file
            .sync_all()
            .await
            .map_err(|e| PortFailure::new(format!("Failed to sync temp settings file: {}", e)))?;

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| PortFailure::new(format!("Failed to replace settings file: {}", e)))?;

        debug!(len = document.len(), "Settings file written (atomic write)");

        Ok(())
    }
}
