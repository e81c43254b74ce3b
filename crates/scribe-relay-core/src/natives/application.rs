use crate::{
    CommandResult, CommandTable, CommandTableBuilder, GetSettings, NativeHandler, RegistryError,
    SetSettings, Settings, SettingsStore, settings,
};

use std::sync::Arc;

use async_trait::async_trait;

#[derive(Clone)]
struct SettingsDocument {
    store: Arc<dyn SettingsStore>,
}

#[async_trait]
impl NativeHandler<GetSettings> for SettingsDocument {
    async fn handle(&self, _args: (), _table: &CommandTable) -> CommandResult<Settings> {
        settings::load(self.store.as_ref()).await
    }
}

#[async_trait]
impl NativeHandler<SetSettings> for SettingsDocument {
    async fn handle(&self, args: Settings, _table: &CommandTable) -> CommandResult<()> {
        settings::save(self.store.as_ref(), &args).await
    }
}

/// Register the application page natives and build the table.
///
/// # Errors
///
/// Fails if the builder is not for the application page context.
pub fn application_page(
    builder: CommandTableBuilder,
    store: Arc<dyn SettingsStore>,
) -> Result<CommandTable, RegistryError> {
    let document = SettingsDocument { store };

    Ok(builder
        .native::<GetSettings, _>(document.clone())?
        .native::<SetSettings, _>(document)?
        .build())
}
