use crate::{ApplicationPageSeed, Browser, FileSettingsStore};

use scribe_relay_core::{
    CommandTable, Destination, ExecutionContext, GetSettings, InProcessBus, PageHost, SetSettings,
    Settings, SettingsStore, background,
};

use std::sync::Arc;

use tempfile::TempDir;

const APP_URL: &str = "app://scribe-relay/app.html";

fn browser(bus: &Arc<InProcessBus>, settings: Arc<dyn SettingsStore>) -> Arc<Browser> {
    Browser::new(
        ApplicationPageSeed {
            bus: bus.clone(),
            settings,
            timeout: None,
            application_url: APP_URL.to_string(),
        },
        "https://relay.example/options",
    )
}

#[allow(clippy::unwrap_used)]
fn background_table(browser: &Arc<Browser>) -> CommandTable {
    background(
        browser.table_builder(ExecutionContext::Background).unwrap(),
        browser.clone(),
    )
    .unwrap()
}

/// WHAT: The first settings call opens the application page and starts its context
/// WHY: The page is created on demand and must be reachable immediately
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_application_page_when_reading_settings_then_page_started_pinned() {
    // Given: A browser with no pages and an empty settings file
    let dir = TempDir::new().unwrap();
    let bus = Arc::new(InProcessBus::new());
    let browser = browser(&bus, Arc::new(FileSettingsStore::new(dir.path().join("settings.json"))));
    let table = background_table(&browser);

    // When: The background reads settings
    let settings = table.invoke::<GetSettings>(()).await.unwrap();

    // Then: Defaults, served from one pinned application page
    assert_eq!(settings, Settings::default());
    let pages = browser.query_pages(APP_URL).await.unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].pinned);
    let tab = pages[0].id.unwrap();
    assert!(bus.is_attached(Destination::tab(tab, ExecutionContext::ApplicationPage)));
}

/// WHAT: Later calls reuse the running application page
/// WHY: At most one application page instance exists
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_application_page_when_writing_settings_then_same_page_and_file_updated() {
    // Given: A browser whose application page is already running
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    let bus = Arc::new(InProcessBus::new());
    let browser = browser(&bus, Arc::new(FileSettingsStore::new(&path)));
    let table = background_table(&browser);
    let mut settings = table.invoke::<GetSettings>(()).await.unwrap();

    // When: Writing settings through the same table
    settings.api_key = "sk-live".to_string();
    table.invoke::<SetSettings>(settings.clone()).await.unwrap();

    // Then: Still one page, and the document on disk carries the change
    assert_eq!(browser.query_pages(APP_URL).await.unwrap().len(), 1);
    let stored: Settings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored, settings);
}

/// WHAT: Ordinary pages do not start a context
/// WHY: Only the application page address hosts the application context
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_ordinary_page_when_created_then_nothing_attached() {
    // Given: A browser
    let dir = TempDir::new().unwrap();
    let bus = Arc::new(InProcessBus::new());
    let browser = browser(&bus, Arc::new(FileSettingsStore::new(dir.path().join("settings.json"))));

    // When: Creating an unrelated page
    let info = browser
        .create_page(scribe_relay_core::NewPage {
            url: "https://example.com".to_string(),
            pinned: false,
            active: true,
        })
        .await
        .unwrap();

    // Then: It is focused but has no context attached
    let tab = info.id.unwrap();
    assert_eq!(browser.active_tab().await.unwrap(), Some(tab));
    for context in ExecutionContext::ALL {
        assert!(!bus.is_attached(Destination::tab(tab, context)));
    }
}
