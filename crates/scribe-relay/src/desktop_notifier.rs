//! Error toasts and configuration prompts as desktop notifications.

use scribe_relay_core::{ErrorToast, Notifier, PortFailure};

use async_trait::async_trait;
use notify_rust::Notification;
use tracing::{debug, instrument};

const APP_NAME: &str = "Scribe Relay";

/// [`Notifier`] rendering through the platform notification service.
pub struct DesktopNotifier;

impl DesktopNotifier {
    async fn show(summary: String, body: String) -> Result<(), PortFailure> {
        // notify-rust blocks on the platform's notification daemon.
        tokio::task::spawn_blocking(move || {
            Notification::new()
                .appname(APP_NAME)
                .summary(&summary)
                .body(&body)
                .show()
                .map(|_| ())
                .map_err(|e| PortFailure::new(format!("Failed to show notification: {}", e)))
        })
        .await
        .map_err(|e| PortFailure::new(format!("Notification task panicked: {}", e)))?
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    #[instrument(skip(self))]
    async fn show_error(&self, toast: &ErrorToast) -> Result<(), PortFailure> {
        let body = toast.detail.clone().unwrap_or_default();
        Self::show(toast.message.clone(), body).await?;
        debug!("Error toast shown");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn prompt_configuration(&self, message: &str) -> Result<(), PortFailure> {
        Self::show(APP_NAME.to_string(), message.to_string()).await
    }
}
