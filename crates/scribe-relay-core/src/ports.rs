//! Collaborators the core consumes but does not implement.
//!
//! Storage, capture hardware, notification rendering and page management
//! belong to the host. Each is a trait here so every context can be wired
//! with real implementations in the binary and with fakes in tests.

use crate::{RecorderState, TabId};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure reported by a host collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PortFailure(String);

impl PortFailure {
    /// Create a failure with a human-readable description.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// An open page as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Host identifier; some hosts report pages without one.
    pub id: Option<TabId>,
    /// Address the page was opened at.
    pub url: String,
    /// Whether the page is pinned (a dedicated instance).
    pub pinned: bool,
}

/// Request to open a new page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    /// Address to open.
    pub url: String,
    /// Open pinned.
    pub pinned: bool,
    /// Take focus.
    pub active: bool,
}

/// Page and tab management surface of the host platform.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// Open pages whose address matches `url`.
    async fn query_pages(&self, url: &str) -> Result<Vec<PageInfo>, PortFailure>;

    /// Open a new page.
    async fn create_page(&self, page: NewPage) -> Result<PageInfo, PortFailure>;

    /// The focused tab, if any.
    async fn active_tab(&self) -> Result<Option<TabId>, PortFailure>;

    /// Show the configuration surface.
    async fn open_options_page(&self) -> Result<(), PortFailure>;

    /// Held by every [`PeerLocator`](crate::PeerLocator) over this host for
    /// the whole query-then-create step, so at most one application page
    /// is ever created.
    fn discovery_lock(&self) -> &Mutex<()>;
}

/// Raw persistence for the settings document.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The stored document, or `None` when nothing was ever written.
    async fn load(&self) -> Result<Option<String>, PortFailure>;

    /// Replace the stored document.
    async fn save(&self, document: String) -> Result<(), PortFailure>;
}

/// An input device offered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDevice {
    /// Identifier persisted in settings.
    pub id: String,
    /// Display label.
    pub label: String,
}

/// Enumerates currently available input devices.
#[async_trait]
pub trait InputDevices: Send + Sync {
    /// Available devices, in host order.
    async fn list_inputs(&self) -> Result<Vec<InputDevice>, PortFailure>;
}

/// Audio capture hardware.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Begin capturing from the device with the given id.
    async fn start(&self, device_id: &str) -> Result<(), PortFailure>;

    /// Finish the current capture.
    async fn stop(&self) -> Result<(), PortFailure>;

    /// Abort any in-flight capture and discard it. A no-op when idle.
    async fn cancel(&self) -> Result<(), PortFailure>;
}

/// Short audio cues played on recorder transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Capture started.
    Start,
    /// Capture stopped.
    Stop,
    /// Capture cancelled.
    Cancel,
}

/// Plays feedback cues. `play` resolves once the cue has finished.
#[async_trait]
pub trait FeedbackPlayer: Send + Sync {
    /// Play one cue.
    async fn play(&self, cue: Cue) -> Result<(), PortFailure>;
}

/// An error handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorToast {
    /// Headline.
    pub message: String,
    /// Optional longer explanation.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Renders messages to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show an error toast.
    async fn show_error(&self, toast: &ErrorToast) -> Result<(), PortFailure>;

    /// Ask the user to finish configuration.
    async fn prompt_configuration(&self, message: &str) -> Result<(), PortFailure>;
}

/// Where the recorder keeps its state between invocations.
///
/// `read` returns the raw stored value so that values this build does not
/// recognise can be observed and ignored instead of rejected.
pub trait StateStore: Send + Sync {
    /// The stored value.
    fn read(&self) -> String;

    /// Replace the stored value.
    fn write(&self, state: RecorderState);
}
