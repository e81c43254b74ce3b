use crate::{
    NewPage, PageHost, PageInfo, PortFailure, RecorderState, SettingsStore, StateStore, TabId,
};

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

#[derive(Default)]
struct Pages {
    open: Vec<PageInfo>,
    active: Option<TabId>,
    next_id: u64,
    created: usize,
    options_opened: usize,
    options_refused: bool,
}

/// Page host keeping its pages in memory.
#[derive(Default)]
pub struct MemoryPageHost {
    pages: Mutex<Pages>,
    discovery: tokio::sync::Mutex<()>,
}

impl MemoryPageHost {
    /// A host with no open pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a page directly, bypassing [`PageHost::create_page`] accounting.
    pub fn open_page(&self, url: &str, pinned: bool) -> TabId {
        let mut pages = self.lock();
        let tab = pages.allocate();
        pages.open.push(PageInfo {
            id: Some(tab),
            url: url.to_string(),
            pinned,
        });
        tab
    }

    /// Record a page that has no identifier.
    pub fn open_anonymous_page(&self, url: &str, pinned: bool) {
        self.lock().open.push(PageInfo {
            id: None,
            url: url.to_string(),
            pinned,
        });
    }

    /// Close a page. Returns whether it was open.
    pub fn close_page(&self, tab: TabId) -> bool {
        let mut pages = self.lock();
        let before = pages.open.len();
        pages.open.retain(|p| p.id != Some(tab));
        if pages.active == Some(tab) {
            pages.active = None;
        }
        pages.open.len() != before
    }

    /// Focus a tab, or nothing.
    pub fn set_active(&self, tab: Option<TabId>) {
        self.lock().active = tab;
    }

    /// Pages created through [`PageHost::create_page`].
    pub fn created_count(&self) -> usize {
        self.lock().created
    }

    /// Times the options page was opened.
    pub fn options_opened(&self) -> usize {
        self.lock().options_opened
    }

    /// Make opening the options page fail, as when no handler is registered
    /// for its address.
    pub fn refuse_options_page(&self, refused: bool) {
        self.lock().options_refused = refused;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Pages> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pages {
    fn allocate(&mut self) -> TabId {
        self.next_id += 1;
        TabId::new(self.next_id)
    }
}

#[async_trait]
impl PageHost for MemoryPageHost {
    async fn query_pages(&self, url: &str) -> Result<Vec<PageInfo>, PortFailure> {
        Ok(self
            .lock()
            .open
            .iter()
            .filter(|p| p.url == url)
            .cloned()
            .collect())
    }

    async fn create_page(&self, page: NewPage) -> Result<PageInfo, PortFailure> {
        let mut pages = self.lock();
        let tab = pages.allocate();
        let info = PageInfo {
            id: Some(tab),
            url: page.url,
            pinned: page.pinned,
        };
        pages.open.push(info.clone());
        pages.created += 1;
        if page.active {
            pages.active = Some(tab);
        }
        debug!(%tab, pinned = info.pinned, "Page created");
        Ok(info)
    }

    async fn active_tab(&self) -> Result<Option<TabId>, PortFailure> {
        Ok(self.lock().active)
    }

    async fn open_options_page(&self) -> Result<(), PortFailure> {
        let mut pages = self.lock();
        if pages.options_refused {
            return Err(PortFailure::new("no handler for the options page address"));
        }
        pages.options_opened += 1;
        Ok(())
    }

    fn discovery_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.discovery
    }
}

/// Settings store holding the document in memory.
#[derive(Default)]
pub struct MemorySettingsStore {
    document: Mutex<Option<String>>,
}

impl MemorySettingsStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `document`, verbatim.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }

    /// The stored document, verbatim.
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<String>, PortFailure> {
        Ok(self.document())
    }

    async fn save(&self, document: String) -> Result<(), PortFailure> {
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(document);
        Ok(())
    }
}

/// Recorder state held in memory, starting idle.
pub struct MemoryStateStore {
    raw: Mutex<String>,
}

impl MemoryStateStore {
    /// A store holding `IDLE`.
    pub fn new() -> Self {
        Self::with_raw(RecorderState::Idle.as_str())
    }

    /// A store holding an arbitrary raw value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(raw.into()),
        }
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self) -> String {
        self.raw
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, state: RecorderState) {
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = state.as_str().to_string();
    }
}
