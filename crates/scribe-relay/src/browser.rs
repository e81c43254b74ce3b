//! Page host for the relay process.
//!
//! Page bookkeeping is delegated to an in-memory host. Opening the
//! application page also starts its execution context: a fresh command table
//! is built and attached to the bus at the new tab, so the page is reachable
//! as soon as `create_page` returns.

use scribe_relay_core::{
    CommandTable, CommandTableBuilder, Destination, ExecutionContext, InProcessBus,
    MemoryPageHost, NewPage, PageHost, PageInfo, PeerLocator, PortFailure, SettingsStore, TabId,
    TransportAdapter, application_page,
};

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Bus and storage the application page context is started with.
pub struct ApplicationPageSeed {
    /// Bus the new context is attached to.
    pub bus: Arc<InProcessBus>,
    /// Settings persistence owned by the application page.
    pub settings: Arc<dyn SettingsStore>,
    /// Round-trip timeout for calls the page makes.
    pub timeout: Option<Duration>,
    /// Canonical address of the application page.
    pub application_url: String,
}

/// [`PageHost`] that spawns the application page context on demand.
///
/// Tables built here locate the application page through the browser itself,
/// so a page the locator creates gets its context started.
pub struct Browser {
    me: Weak<Browser>,
    pages: MemoryPageHost,
    seed: ApplicationPageSeed,
    options_url: String,
}

impl Browser {
    /// Create a browser with no open pages.
    pub fn new(seed: ApplicationPageSeed, options_url: impl Into<String>) -> Arc<Self> {
        let options_url = options_url.into();
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            pages: MemoryPageHost::new(),
            seed,
            options_url,
        })
    }

    /// Open a page at `url` without starting a context in it.
    pub fn open_page(&self, url: &str) -> TabId {
        self.pages.open_page(url, false)
    }

    /// Focus a tab.
    pub fn focus(&self, tab: TabId) {
        self.pages.set_active(Some(tab));
    }

    /// Build a table for `context` talking over the shared bus.
    ///
    /// Returns `None` once the browser is being dropped.
    pub fn table_builder(&self, context: ExecutionContext) -> Option<CommandTableBuilder> {
        let host: Arc<dyn PageHost> = self.me.upgrade()?;

        let mut transport = TransportAdapter::new(self.seed.bus.clone());
        if let Some(timeout) = self.seed.timeout {
            transport = transport.with_timeout(timeout);
        }

        Some(CommandTable::builder(
            context,
            transport,
            PeerLocator::new(host, self.seed.application_url.clone()),
        ))
    }

    fn start_application_page(&self, tab: TabId) -> Result<(), PortFailure> {
        let builder = self
            .table_builder(ExecutionContext::ApplicationPage)
            .ok_or_else(|| PortFailure::new("browser is shutting down"))?;
        let table = application_page(builder, self.seed.settings.clone())
            .map_err(|e| PortFailure::new(e.to_string()))?;

        // The task runs until the tab is detached from the bus.
        let destination = Destination::tab(tab, ExecutionContext::ApplicationPage);
        drop(
            self.seed
                .bus
                .attach(destination, Arc::new(table))
                .map_err(|e| PortFailure::new(e.to_string()))?,
        );
        info!(%tab, "Application page context started");

        Ok(())
    }
}

#[async_trait]
impl PageHost for Browser {
    async fn query_pages(&self, url: &str) -> Result<Vec<PageInfo>, PortFailure> {
        self.pages.query_pages(url).await
    }

    #[instrument(skip(self))]
    async fn create_page(&self, page: NewPage) -> Result<PageInfo, PortFailure> {
        let starts_application = page.url == self.seed.application_url;
        let info = self.pages.create_page(page).await?;

        if starts_application {
            let Some(tab) = info.id else {
                return Err(PortFailure::new("application page opened without an id"));
            };
            self.start_application_page(tab)?;
        }

        Ok(info)
    }

    async fn active_tab(&self) -> Result<Option<TabId>, PortFailure> {
        self.pages.active_tab().await
    }

    #[instrument(skip(self), fields(url = %self.options_url))]
    async fn open_options_page(&self) -> Result<(), PortFailure> {
        let url = self.options_url.clone();
        let opened = tokio::task::spawn_blocking(move || open::that(url))
            .await
            .map_err(|e| PortFailure::new(format!("Open task panicked: {}", e)))?;

        if let Err(e) = opened {
            warn!(error = %e, "Failed to open options page in the system browser");
            return Err(PortFailure::new(format!("Failed to open options page: {}", e)));
        }

        info!("Opened options page");

        Ok(())
    }

    fn discovery_lock(&self) -> &Mutex<()> {
        self.pages.discovery_lock()
    }
}
