use crate::{
    CommandError, CommandResult, CommandTable, CommandTableBuilder, GetCurrentTabId,
    NativeHandler, OpenOptionsPage, PageHost, RegistryError, TabId,
};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

#[derive(Clone)]
struct Tabs {
    host: Arc<dyn PageHost>,
}

#[async_trait]
impl NativeHandler<OpenOptionsPage> for Tabs {
    #[instrument(skip_all)]
    async fn handle(&self, _args: (), _table: &CommandTable) -> CommandResult<()> {
        self.host
            .open_options_page()
            .await
            .map_err(|e| CommandError::Host {
                reason: e.to_string(),
            })?;

        info!("Options page opened");

        Ok(())
    }
}

#[async_trait]
impl NativeHandler<GetCurrentTabId> for Tabs {
    async fn handle(&self, _args: (), _table: &CommandTable) -> CommandResult<TabId> {
        self.host
            .active_tab()
            .await
            .map_err(|e| CommandError::Host {
                reason: e.to_string(),
            })?
            .ok_or(CommandError::NoActiveTab)
    }
}

/// Register the background natives and build the table.
///
/// # Errors
///
/// Fails if the builder is not for the background context.
pub fn background(
    builder: CommandTableBuilder,
    host: Arc<dyn PageHost>,
) -> Result<CommandTable, RegistryError> {
    let tabs = Tabs { host };

    Ok(builder
        .native::<OpenOptionsPage, _>(tabs.clone())?
        .native::<GetCurrentTabId, _>(tabs)?
        .build())
}
