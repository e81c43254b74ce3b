//! Scribe Relay Core Library
//!
//! Cross-context command dispatch and the recorder state machine built on
//! it. A command runs natively in exactly one of three isolated execution
//! contexts (the background process, the script injected into pages, and
//! the long-lived application page) and is callable from the others through
//! asynchronous message passing.
//!
//! # Example
//!
//! ```no_run
//! use scribe_relay_core::{
//!     CommandTable, ExecutionContext, GetSettings, InProcessBus, MemoryPageHost, PeerLocator,
//!     TransportAdapter,
//! };
//!
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = Arc::new(InProcessBus::new());
//! let pages = Arc::new(MemoryPageHost::new());
//!
//! let table = CommandTable::builder(
//!     ExecutionContext::Background,
//!     TransportAdapter::new(bus.clone()),
//!     PeerLocator::new(pages.clone(), "app://scribe-relay/app.html"),
//! );
//! let background = scribe_relay_core::background(table, pages)?;
//!
//! let settings = background.invoke::<GetSettings>(()).await?;
//! println!("Recording from {}", settings.selected_device_id);
//! # Ok(())
//! # }
//! ```

mod bus;
mod context;
mod dispatch;
mod error;
mod natives;
mod ports;
mod recorder;
mod settings;

pub use {
    bus::{InProcessBus, MemoryPageHost, MemorySettingsStore, MemoryStateStore},
    context::{Destination, ExecutionContext, PeerHandle, TabId},
    dispatch::{
        CATALOG, CancelRecording, Command, CommandSpec, CommandTable, CommandTableBuilder,
        Envelope, GetCurrentTabId, GetSettings, NativeHandler, OpenOptionsPage, PeerLocator, Reply,
        SendErrorToast, SetSettings, ShimRoute, ToggleRecording, Transport, TransportAdapter,
        TransportFailure, lookup,
    },
    error::{CommandError, CommandResult, DispatchError, RegistryError, Result as CoreResult},
    natives::{application_page, background, global_injected},
    ports::{
        AudioCapture, Cue, ErrorToast, FeedbackPlayer, InputDevice, InputDevices, NewPage,
        Notifier, PageHost, PageInfo, PortFailure, SettingsStore, StateStore,
    },
    recorder::{Recorder, RecorderPorts, RecorderState, StoredState, Transition},
    settings::Settings,
};

/// Canonical address of the application page.
pub const APPLICATION_PAGE_URL: &str = "app://scribe-relay/app.html";

#[cfg(test)]
mod tests;
