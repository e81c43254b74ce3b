//! In-process implementations of the host collaborators.
//!
//! Used by the host binary, which runs every context inside one process,
//! and by the tests.

mod channel;
mod memory;

pub use {
    channel::InProcessBus,
    memory::{MemoryPageHost, MemorySettingsStore, MemoryStateStore},
};
