//! Best-effort input device reconciliation.
//!
//! Runs before every toggle. When the persisted device is no longer offered
//! by the host, the first available device is substituted and persisted.
//! Nothing in here may block the toggle, so every failure ends as a log line.

use crate::{CommandError, CommandResult, CommandTable, GetSettings, InputDevices, SetSettings};

use tracing::{debug, info, instrument, warn};

#[instrument(skip_all)]
pub(crate) async fn reconcile(table: &CommandTable, devices: &dyn InputDevices) {
    match substitute_missing_device(table, devices).await {
        Ok(Some(device_id)) => debug!(%device_id, "Input device substituted"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Input device fallback skipped"),
    }
}

async fn substitute_missing_device(
    table: &CommandTable,
    devices: &dyn InputDevices,
) -> CommandResult<Option<String>> {
    let mut settings = table.invoke::<GetSettings>(()).await?;

    let available = devices
        .list_inputs()
        .await
        .map_err(|e| CommandError::Capture {
            reason: format!("device enumeration failed: {}", e),
        })?;

    if available.iter().any(|d| d.id == settings.selected_device_id) {
        return Ok(None);
    }

    let Some(first) = available.first() else {
        debug!("No input devices enumerated, keeping selection");
        return Ok(None);
    };

    info!(
        missing = %settings.selected_device_id,
        substitute = %first.id,
        "Selected input device unavailable, falling back"
    );

    settings.selected_device_id = first.id.clone();
    table.invoke::<SetSettings>(settings).await?;

    Ok(Some(first.id.clone()))
}
