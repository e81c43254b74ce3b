use crate::{
    CancelRecording, CommandError, CommandResult, CommandTable, CommandTableBuilder, ErrorToast,
    NativeHandler, Notifier, Recorder, RegistryError, SendErrorToast, ToggleRecording, Transition,
};

use std::sync::Arc;

use async_trait::async_trait;

#[derive(Clone)]
struct RecorderCommands {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl NativeHandler<ToggleRecording> for RecorderCommands {
    async fn handle(&self, _args: (), table: &CommandTable) -> CommandResult<Transition> {
        self.recorder.toggle(table).await
    }
}

#[async_trait]
impl NativeHandler<CancelRecording> for RecorderCommands {
    async fn handle(&self, _args: (), table: &CommandTable) -> CommandResult<()> {
        self.recorder.cancel(table).await
    }
}

struct Toasts {
    notifier: Arc<dyn Notifier>,
}

#[async_trait]
impl NativeHandler<SendErrorToast> for Toasts {
    async fn handle(&self, toast: ErrorToast, _table: &CommandTable) -> CommandResult<()> {
        self.notifier
            .show_error(&toast)
            .await
            .map_err(|e| CommandError::Notification {
                reason: e.to_string(),
            })
    }
}

/// Register the injected-script natives and build the table.
///
/// # Errors
///
/// Fails if the builder is not for the injected context.
pub fn global_injected(
    builder: CommandTableBuilder,
    recorder: Arc<Recorder>,
    notifier: Arc<dyn Notifier>,
) -> Result<CommandTable, RegistryError> {
    let commands = RecorderCommands { recorder };

    Ok(builder
        .native::<ToggleRecording, _>(commands.clone())?
        .native::<CancelRecording, _>(commands)?
        .native::<SendErrorToast, _>(Toasts { notifier })?
        .build())
}
