//! Typed cross-context command dispatch.
//!
//! A command runs natively in exactly one [`ExecutionContext`](crate::ExecutionContext).
//! Every other context reaches it through a shim listed in the [`CATALOG`],
//! which marshals the call into an [`Envelope`] and sends it through the
//! [`TransportAdapter`] to the native context.

mod catalog;
mod command;
mod envelope;
mod handler;
mod locator;
mod table;
mod transport;

pub(crate) use handler::DynHandler;

pub use {
    catalog::{CATALOG, CommandSpec, ShimRoute, lookup},
    command::{
        CancelRecording, Command, GetCurrentTabId, GetSettings, OpenOptionsPage, SendErrorToast,
        SetSettings, ToggleRecording,
    },
    envelope::{Envelope, Reply},
    handler::NativeHandler,
    locator::PeerLocator,
    table::{CommandTable, CommandTableBuilder},
    transport::{Transport, TransportAdapter, TransportFailure},
};
