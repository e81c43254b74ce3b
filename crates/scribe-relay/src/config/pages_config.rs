use crate::config::{default_application_url, default_start_url};

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Addresses of the pages the host manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagesConfig {
    /// Canonical address of the application page.
    #[serde(default = "default_application_url")]
    pub application_url: String,
    /// Configuration surface opened when no credential is set. When absent
    /// the settings document itself is opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_url: Option<String>,
    /// Page the injected context is attached to at startup.
    #[serde(default = "default_start_url")]
    pub start_url: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            application_url: default_application_url(),
            options_url: None,
            start_url: default_start_url(),
        }
    }
}

impl PagesConfig {
    /// What the system opener is handed to show the configuration surface.
    pub fn options_target(&self, settings_path: &Path) -> String {
        self.options_url
            .clone()
            .unwrap_or_else(|| settings_path.display().to_string())
    }
}
