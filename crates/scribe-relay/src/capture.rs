//! Microphone capture and input enumeration on top of cpal.
//!
//! Captured samples are kept in a bounded ring buffer. Encoding and
//! transcription happen elsewhere; `stop` only reports how much was captured.

use crate::{AppError, AppResult};

use scribe_relay_core::{AudioCapture, InputDevice, InputDevices, PortFailure};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Device id meaning "whatever the host considers the default input".
pub(crate) const DEFAULT_DEVICE_ID: &str = "default";

/// Maximum samples to buffer (5 minutes at 48kHz mono).
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

struct ActiveCapture {
    stream: Stream,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Set before the stream is dropped so a late callback writes nothing.
    shutdown: Arc<AtomicBool>,
}

impl ActiveCapture {
    /// Stop the stream and return the number of buffered samples.
    fn finish(self) -> usize {
        self.shutdown.store(true, Ordering::Release);
        drop(self.stream);

        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// [`AudioCapture`] recording from a cpal input device.
#[derive(Default)]
pub struct CpalCapture {
    active: Mutex<Option<ActiveCapture>>,
}

impl CpalCapture {
    /// A capturer with nothing recording.
    pub fn new() -> Self {
        Self::default()
    }

    fn take_active(&self) -> Option<ActiveCapture> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    #[track_caller]
    fn open(device_id: &str) -> AppResult<ActiveCapture> {
        let device = find_input(device_id)?;

        let config: StreamConfig = device
            .default_input_config()
            .map_err(|e| AppError::AudioDevice {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        let samples = Arc::new(Mutex::new(VecDeque::with_capacity(MAX_BUFFER_SAMPLES)));
        let shutdown = Arc::new(AtomicBool::new(false));

        let stream = {
            let samples = Arc::clone(&samples);
            let shutdown = Arc::clone(&shutdown);

            device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if shutdown.load(Ordering::Acquire) {
                            return;
                        }
                        let mut buf = samples.lock().unwrap_or_else(|e| {
                            error!("Sample buffer lock poisoned, recovering: {}", e);
                            e.into_inner()
                        });
                        buf.extend(data.iter().copied());
                        while buf.len() > MAX_BUFFER_SAMPLES {
                            buf.pop_front();
                        }
                    },
                    |err| {
                        error!("Audio stream error: {}", err);
                    },
                    None,
                )
                .map_err(|e| AppError::AudioDevice {
                    reason: format!("Failed to build stream: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
        };

        stream.play().map_err(|e| AppError::AudioDevice {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(ActiveCapture {
            stream,
            samples,
            shutdown,
        })
    }
}

#[async_trait]
impl AudioCapture for CpalCapture {
    #[instrument(skip(self))]
    async fn start(&self, device_id: &str) -> Result<(), PortFailure> {
        let capture = Self::open(device_id).map_err(|e| PortFailure::new(e.to_string()))?;

        if let Some(previous) = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(capture)
        {
            warn!("Replacing a capture that was never stopped");
            previous.finish();
        }

        info!(device_id, "Audio capture started");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&self) -> Result<(), PortFailure> {
        match self.take_active() {
            Some(capture) => {
                let sample_count = capture.finish();
                info!(sample_count, "Audio capture stopped");
            }
            None => debug!("Stop requested with no capture running"),
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn cancel(&self) -> Result<(), PortFailure> {
        if let Some(capture) = self.take_active() {
            let discarded = capture.finish();
            info!(discarded, "Audio capture cancelled");
        }

        Ok(())
    }
}

/// [`InputDevices`] listing the default cpal host's inputs.
///
/// The host default is always offered first under [`DEFAULT_DEVICE_ID`].
pub struct CpalInputs;

#[async_trait]
impl InputDevices for CpalInputs {
    #[instrument(skip(self))]
    async fn list_inputs(&self) -> Result<Vec<InputDevice>, PortFailure> {
        let devices = cpal::default_host()
            .input_devices()
            .map_err(|e| PortFailure::new(format!("Failed to enumerate inputs: {}", e)))?;

        let default = InputDevice {
            id: DEFAULT_DEVICE_ID.to_string(),
            label: "System default".to_string(),
        };

        let inputs: Vec<InputDevice> = std::iter::once(default)
            .chain(
                devices
                    .filter_map(|device| device_label(&device))
                    .map(|label| InputDevice {
                        id: label.clone(),
                        label,
                    }),
            )
            .collect();

        debug!(count = inputs.len(), "Input devices enumerated");

        Ok(inputs)
    }
}

#[allow(deprecated)]
fn device_label(device: &Device) -> Option<String> {
    device.name().ok()
}

#[track_caller]
fn find_input(device_id: &str) -> AppResult<Device> {
    let host = cpal::default_host();

    let device = if device_id == DEFAULT_DEVICE_ID {
        host.default_input_device()
    } else {
        host.input_devices()
            .map_err(|e| AppError::AudioDevice {
                reason: format!("Failed to enumerate inputs: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .find(|device| device_label(device).as_deref() == Some(device_id))
    };

    device.ok_or_else(|| AppError::AudioDevice {
        reason: format!("No input device named {:?}", device_id),
        location: ErrorLocation::from(Location::caller()),
    })
}
