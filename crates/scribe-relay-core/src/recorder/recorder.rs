//! Recorder state machine.
//!
//! Lives in the injected context and coordinates capture, feedback cues and
//! the device fallback through the command table. State only moves along
//! `IDLE -> RECORDING` and `RECORDING -> IDLE`, and only after the
//! side effect that justifies the move has succeeded.

use crate::{
    AudioCapture, CommandError, CommandResult, CommandTable, Cue, FeedbackPlayer, GetSettings,
    InputDevices, Notifier, OpenOptionsPage, StateStore,
    recorder::{RecorderState, StoredState, Transition, device_fallback},
};

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

const CONFIGURATION_PROMPT: &str =
    "An API key is required before recording. Opening the settings page.";

/// Collaborators owned by a [`Recorder`].
pub struct RecorderPorts {
    /// Capture hardware.
    pub capture: Arc<dyn AudioCapture>,
    /// Input device enumeration.
    pub devices: Arc<dyn InputDevices>,
    /// Cue playback.
    pub feedback: Arc<dyn FeedbackPlayer>,
    /// Configuration prompt.
    pub notifier: Arc<dyn Notifier>,
    /// Persisted recorder state.
    pub state: Arc<dyn StateStore>,
}

/// Start/stop/cancel coordinator.
///
/// Toggle and cancel hold `in_flight` for their whole read-check-act
/// sequence, so overlapping invocations within this context run one after
/// another instead of interleaving across suspension points.
pub struct Recorder {
    capture: Arc<dyn AudioCapture>,
    devices: Arc<dyn InputDevices>,
    feedback: Arc<dyn FeedbackPlayer>,
    notifier: Arc<dyn Notifier>,
    state: Arc<dyn StateStore>,
    in_flight: Mutex<()>,
}

impl Recorder {
    /// Create a recorder around its collaborators.
    pub fn new(ports: RecorderPorts) -> Self {
        Self {
            capture: ports.capture,
            devices: ports.devices,
            feedback: ports.feedback,
            notifier: ports.notifier,
            state: ports.state,
            in_flight: Mutex::new(()),
        }
    }

    /// Current stored state.
    pub fn state(&self) -> StoredState {
        StoredState::read(self.state.as_ref())
    }

    /// Start recording when idle, stop when recording.
    ///
    /// # Errors
    ///
    /// [`CommandError::Configuration`] when no credential is set, whether or
    /// not the configuration page could be opened. Capture and settings
    /// failures propagate; the stored state is left as it was.
    #[instrument(skip_all)]
    pub async fn toggle(&self, table: &CommandTable) -> CommandResult<Transition> {
        let _in_flight = self.in_flight.lock().await;

        device_fallback::reconcile(table, self.devices.as_ref()).await;

        let settings = table.invoke::<GetSettings>(()).await?;

        if !settings.has_credential() {
            warn!("No API key configured, redirecting to settings");
            if let Err(e) = self.notifier.prompt_configuration(CONFIGURATION_PROMPT).await {
                warn!(error = %e, "Failed to show configuration prompt");
            }
            if let Err(e) = table.invoke::<OpenOptionsPage>(()).await {
                warn!(error = %e, "Failed to open the configuration page");
            }
            return Err(CommandError::Configuration {
                reason: "no API key configured".to_string(),
            });
        }

        match StoredState::read(self.state.as_ref()) {
            StoredState::Valid(RecorderState::Idle) => {
                self.capture
                    .start(&settings.selected_device_id)
                    .await
                    .map_err(|e| CommandError::Capture {
                        reason: e.to_string(),
                    })?;

                if settings.sound_on_toggle {
                    self.play(Cue::Start).await;
                }

                info!(device_id = %settings.selected_device_id, "Recording started");
                self.state.write(RecorderState::Recording);

                Ok(Transition::Started)
            }
            StoredState::Valid(RecorderState::Recording) => {
                self.capture.stop().await.map_err(|e| CommandError::Capture {
                    reason: e.to_string(),
                })?;

                if settings.sound_on_toggle {
                    self.play(Cue::Stop).await;
                }

                info!("Recording stopped");
                self.state.write(RecorderState::Idle);

                Ok(Transition::Stopped)
            }
            StoredState::Invalid(raw) => {
                warn!(state = %raw, "Ignoring toggle from unrecognised recorder state");
                Ok(Transition::Ignored)
            }
        }
    }

    /// Abort any capture and force the recorder idle.
    ///
    /// Idempotent: cancelling while idle still asks the capture collaborator
    /// to cancel and still commits `IDLE`. The cancel cue only plays when a
    /// recording was actually interrupted.
    #[instrument(skip_all)]
    pub async fn cancel(&self, table: &CommandTable) -> CommandResult<()> {
        let _in_flight = self.in_flight.lock().await;

        let previous = StoredState::read(self.state.as_ref());
        let was_recording = previous == StoredState::Valid(RecorderState::Recording);

        let play_cue = if was_recording {
            table.invoke::<GetSettings>(()).await?.sound_on_toggle
        } else {
            false
        };

        self.capture.cancel().await.map_err(|e| CommandError::Capture {
            reason: e.to_string(),
        })?;

        if play_cue {
            self.play(Cue::Cancel).await;
        }

        info!(%previous, "Recording cancelled");
        self.state.write(RecorderState::Idle);

        Ok(())
    }

    async fn play(&self, cue: Cue) {
        if let Err(e) = self.feedback.play(cue).await {
            warn!(?cue, error = %e, "Feedback cue failed");
        }
    }
}
