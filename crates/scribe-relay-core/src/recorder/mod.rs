mod device_fallback;
#[allow(clippy::module_inception)]
mod recorder;
mod state;

pub use {
    recorder::{Recorder, RecorderPorts},
    state::{RecorderState, StoredState, Transition},
};
