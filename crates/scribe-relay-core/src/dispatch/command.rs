//! Command definitions.
//!
//! Each command is a marker type tying its catalog name to its native
//! context and its argument and result shapes, so a call site cannot pair a
//! name with the wrong payload.

use crate::{ErrorToast, ExecutionContext, Settings, TabId, Transition};

use serde::{Serialize, de::DeserializeOwned};

/// A command callable from any context.
pub trait Command: Send + Sync + 'static {
    /// Catalog and wire name.
    const NAME: &'static str;

    /// The one context that runs the real implementation.
    const NATIVE: ExecutionContext;

    /// Argument shape.
    type Args: Serialize + DeserializeOwned + Send + 'static;

    /// Result shape.
    type Output: Serialize + DeserializeOwned + Send + 'static;
}

/// Opens the configuration surface.
pub struct OpenOptionsPage;

impl Command for OpenOptionsPage {
    const NAME: &'static str = "openOptionsPage";
    const NATIVE: ExecutionContext = ExecutionContext::Background;
    type Args = ();
    type Output = ();
}

/// Returns the active tab, failing when there is none.
pub struct GetCurrentTabId;

impl Command for GetCurrentTabId {
    const NAME: &'static str = "getCurrentTabId";
    const NATIVE: ExecutionContext = ExecutionContext::Background;
    type Args = ();
    type Output = TabId;
}

/// Reads the persisted settings document.
pub struct GetSettings;

impl Command for GetSettings {
    const NAME: &'static str = "getSettings";
    const NATIVE: ExecutionContext = ExecutionContext::ApplicationPage;
    type Args = ();
    type Output = Settings;
}

/// Replaces the persisted settings document.
pub struct SetSettings;

impl Command for SetSettings {
    const NAME: &'static str = "setSettings";
    const NATIVE: ExecutionContext = ExecutionContext::ApplicationPage;
    type Args = Settings;
    type Output = ();
}

/// Starts or stops recording.
pub struct ToggleRecording;

impl Command for ToggleRecording {
    const NAME: &'static str = "toggleRecording";
    const NATIVE: ExecutionContext = ExecutionContext::GlobalInjected;
    type Args = ();
    type Output = Transition;
}

/// Aborts any capture and returns the recorder to idle.
pub struct CancelRecording;

impl Command for CancelRecording {
    const NAME: &'static str = "cancelRecording";
    const NATIVE: ExecutionContext = ExecutionContext::GlobalInjected;
    type Args = ();
    type Output = ();
}

/// Hands an error to the notification collaborator.
pub struct SendErrorToast;

impl Command for SendErrorToast {
    const NAME: &'static str = "sendErrorToast";
    const NATIVE: ExecutionContext = ExecutionContext::GlobalInjected;
    type Args = ErrorToast;
    type Output = ();
}
