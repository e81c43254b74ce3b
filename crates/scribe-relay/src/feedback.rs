//! Short sine-tone cues on the default output device.

use crate::{AppError, AppResult};

use scribe_relay_core::{Cue, FeedbackPlayer, PortFailure};

use std::{f32::consts::TAU, panic::Location, time::Duration};

use async_trait::async_trait;
use cpal::{
    SampleFormat, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, instrument};

const CUE_DURATION: Duration = Duration::from_millis(120);
const AMPLITUDE: f32 = 0.2;

/// Tone frequency for each cue, in hertz.
pub(crate) fn cue_frequency(cue: Cue) -> f32 {
    match cue {
        Cue::Start => 880.0,
        Cue::Stop => 660.0,
        Cue::Cancel => 440.0,
    }
}

/// [`FeedbackPlayer`] synthesising each cue as a short tone.
pub struct ToneFeedback;

#[async_trait]
impl FeedbackPlayer for ToneFeedback {
    #[instrument(skip(self))]
    async fn play(&self, cue: Cue) -> Result<(), PortFailure> {
        let frequency = cue_frequency(cue);

        // The stream must stay alive for the whole cue, which blocks.
        tokio::task::spawn_blocking(move || play_tone(frequency, CUE_DURATION))
            .await
            .map_err(|e| PortFailure::new(format!("Cue task panicked: {}", e)))?
            .map_err(|e| PortFailure::new(e.to_string()))?;

        debug!(?cue, "Cue played");

        Ok(())
    }
}

#[track_caller]
fn play_tone(frequency: f32, duration: Duration) -> AppResult<()> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| AppError::AudioDevice {
            reason: "No output device found".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let supported = device
        .default_output_config()
        .map_err(|e| AppError::AudioDevice {
            reason: format!("Failed to get output config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if supported.sample_format() != SampleFormat::F32 {
        return Err(AppError::AudioDevice {
            reason: format!("Unsupported output format: {:?}", supported.sample_format()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let config: StreamConfig = supported.into();
    let sample_rate = config.sample_rate as f32;
    let channels = usize::from(config.channels).max(1);
    let mut phase = 0.0_f32;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    frame.fill((phase * TAU).sin() * AMPLITUDE);
                    phase = (phase + frequency / sample_rate) % 1.0;
                }
            },
            |err| {
                error!("Output stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AppError::AudioDevice {
            reason: format!("Failed to build output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.play().map_err(|e| AppError::AudioDevice {
        reason: format!("Failed to start output stream: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    std::thread::sleep(duration);

    Ok(())
}
