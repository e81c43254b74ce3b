//! Fakes and a three-context harness wired through the in-process bus.

#![allow(clippy::unwrap_used)]

use crate::{
    APPLICATION_PAGE_URL, AudioCapture, CommandTable, CommandTableBuilder, Cue, Destination,
    ErrorToast, ExecutionContext, FeedbackPlayer, InProcessBus, InputDevice, InputDevices,
    MemoryPageHost, MemorySettingsStore, MemoryStateStore, Notifier, PeerLocator, PortFailure,
    Recorder, RecorderPorts, Settings, SettingsStore, TabId, TransportAdapter, application_page,
    background, global_injected,
};

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

pub(crate) const PAGE_URL: &str = "https://example.com/article";
pub(crate) const TEST_API_KEY: &str = "sk-test";

/// Records capture calls; start, stop and cancel can be made to fail.
#[derive(Default)]
pub(crate) struct FakeCapture {
    calls: Mutex<Vec<String>>,
    fail_start: AtomicBool,
    fail_stop: AtomicBool,
    fail_cancel: AtomicBool,
}

impl FakeCapture {
    pub(crate) fn failing_start() -> Self {
        let capture = Self::default();
        capture.fail_start.store(true, Ordering::SeqCst);
        capture
    }

    pub(crate) fn failing_stop() -> Self {
        let capture = Self::default();
        capture.fail_stop.store(true, Ordering::SeqCst);
        capture
    }

    pub(crate) fn failing_cancel() -> Self {
        let capture = Self::default();
        capture.fail_cancel.store(true, Ordering::SeqCst);
        capture
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioCapture for FakeCapture {
    async fn start(&self, device_id: &str) -> Result<(), PortFailure> {
        self.record(format!("start:{device_id}"));
        // Yield so overlapping invocations get a chance to interleave.
        tokio::task::yield_now().await;
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(PortFailure::new("microphone permission denied"));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), PortFailure> {
        self.record("stop".to_string());
        tokio::task::yield_now().await;
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(PortFailure::new("device disconnected"));
        }
        Ok(())
    }

    async fn cancel(&self) -> Result<(), PortFailure> {
        self.record("cancel".to_string());
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(PortFailure::new("device disconnected"));
        }
        Ok(())
    }
}

/// Fixed device list; enumeration can be made to fail.
pub(crate) struct FakeDevices {
    devices: Vec<InputDevice>,
    fail: bool,
}

impl FakeDevices {
    pub(crate) fn listing(ids: &[&str]) -> Self {
        Self {
            devices: ids.iter().map(|id| device(id)).collect(),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            devices: Vec::new(),
            fail: true,
        }
    }
}

impl Default for FakeDevices {
    fn default() -> Self {
        Self::listing(&["default"])
    }
}

#[async_trait]
impl InputDevices for FakeDevices {
    async fn list_inputs(&self) -> Result<Vec<InputDevice>, PortFailure> {
        if self.fail {
            return Err(PortFailure::new("enumeration not permitted"));
        }
        Ok(self.devices.clone())
    }
}

pub(crate) fn device(id: &str) -> InputDevice {
    InputDevice {
        id: id.to_string(),
        label: format!("Microphone ({id})"),
    }
}

#[derive(Default)]
pub(crate) struct FakeFeedback {
    cues: Mutex<Vec<Cue>>,
}

impl FakeFeedback {
    pub(crate) fn cues(&self) -> Vec<Cue> {
        self.cues.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackPlayer for FakeFeedback {
    async fn play(&self, cue: Cue) -> Result<(), PortFailure> {
        self.cues.lock().unwrap().push(cue);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeNotifier {
    toasts: Mutex<Vec<ErrorToast>>,
    prompts: AtomicUsize,
}

impl FakeNotifier {
    pub(crate) fn toasts(&self) -> Vec<ErrorToast> {
        self.toasts.lock().unwrap().clone()
    }

    pub(crate) fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn show_error(&self, toast: &ErrorToast) -> Result<(), PortFailure> {
        self.toasts.lock().unwrap().push(toast.clone());
        Ok(())
    }

    async fn prompt_configuration(&self, _message: &str) -> Result<(), PortFailure> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) fn configured_settings() -> Settings {
    Settings {
        api_key: TEST_API_KEY.to_string(),
        ..Settings::default()
    }
}

pub(crate) fn store_with(settings: &Settings) -> MemorySettingsStore {
    MemorySettingsStore::with_document(serde_json::to_string(settings).unwrap())
}

pub(crate) fn table_builder(
    context: ExecutionContext,
    bus: &Arc<InProcessBus>,
    pages: &Arc<MemoryPageHost>,
) -> CommandTableBuilder {
    CommandTable::builder(
        context,
        TransportAdapter::new(bus.clone()),
        PeerLocator::new(pages.clone(), APPLICATION_PAGE_URL),
    )
}

/// Settings store that cannot be read or written.
pub(crate) struct UnavailableStore;

#[async_trait]
impl SettingsStore for UnavailableStore {
    async fn load(&self) -> Result<Option<String>, PortFailure> {
        Err(PortFailure::new("storage quota exceeded"))
    }

    async fn save(&self, _document: String) -> Result<(), PortFailure> {
        Err(PortFailure::new("storage quota exceeded"))
    }
}

/// Collaborators a harness is built from.
pub(crate) struct Parts {
    pub(crate) capture: FakeCapture,
    pub(crate) devices: FakeDevices,
    pub(crate) store: MemorySettingsStore,
    pub(crate) state: MemoryStateStore,
    /// Serve settings from [`UnavailableStore`] instead of `store`.
    pub(crate) settings_unavailable: bool,
}

impl Parts {
    /// Parts with a credential already configured.
    pub(crate) fn configured() -> Self {
        Self {
            store: store_with(&configured_settings()),
            ..Self::default()
        }
    }
}

impl Default for Parts {
    fn default() -> Self {
        Self {
            capture: FakeCapture::default(),
            devices: FakeDevices::default(),
            store: MemorySettingsStore::new(),
            state: MemoryStateStore::new(),
            settings_unavailable: false,
        }
    }
}

/// Background, injected and application page tables served on one bus.
pub(crate) struct Harness {
    pub(crate) bus: Arc<InProcessBus>,
    pub(crate) pages: Arc<MemoryPageHost>,
    pub(crate) store: Arc<MemorySettingsStore>,
    pub(crate) state: Arc<MemoryStateStore>,
    pub(crate) capture: Arc<FakeCapture>,
    pub(crate) feedback: Arc<FakeFeedback>,
    pub(crate) notifier: Arc<FakeNotifier>,
    pub(crate) recorder: Arc<Recorder>,
    pub(crate) background: Arc<CommandTable>,
    pub(crate) injected: Arc<CommandTable>,
    pub(crate) application: Arc<CommandTable>,
    pub(crate) page_tab: TabId,
    pub(crate) app_tab: TabId,
}

impl Harness {
    /// Must be called from inside a tokio runtime.
    pub(crate) fn start(parts: Parts) -> Self {
        let bus = Arc::new(InProcessBus::new());
        let pages = Arc::new(MemoryPageHost::new());

        let page_tab = pages.open_page(PAGE_URL, false);
        pages.set_active(Some(page_tab));
        let app_tab = pages.open_page(APPLICATION_PAGE_URL, true);

        let store = Arc::new(parts.store);
        let settings: Arc<dyn SettingsStore> = if parts.settings_unavailable {
            Arc::new(UnavailableStore)
        } else {
            store.clone()
        };
        let state = Arc::new(parts.state);
        let capture = Arc::new(parts.capture);
        let feedback = Arc::new(FakeFeedback::default());
        let notifier = Arc::new(FakeNotifier::default());

        let recorder = Arc::new(Recorder::new(RecorderPorts {
            capture: capture.clone(),
            devices: Arc::new(parts.devices),
            feedback: feedback.clone(),
            notifier: notifier.clone(),
            state: state.clone(),
        }));

        let background = Arc::new(
            background(
                table_builder(ExecutionContext::Background, &bus, &pages),
                pages.clone(),
            )
            .unwrap(),
        );
        let injected = Arc::new(
            global_injected(
                table_builder(ExecutionContext::GlobalInjected, &bus, &pages),
                recorder.clone(),
                notifier.clone(),
            )
            .unwrap(),
        );
        let application = Arc::new(
            application_page(
                table_builder(ExecutionContext::ApplicationPage, &bus, &pages),
                settings,
            )
            .unwrap(),
        );

        bus.attach(Destination::Background, background.clone())
            .unwrap();
        bus.attach(
            Destination::tab(page_tab, ExecutionContext::GlobalInjected),
            injected.clone(),
        )
        .unwrap();
        bus.attach(
            Destination::tab(app_tab, ExecutionContext::ApplicationPage),
            application.clone(),
        )
        .unwrap();

        Self {
            bus,
            pages,
            store,
            state,
            capture,
            feedback,
            notifier,
            recorder,
            background,
            injected,
            application,
            page_tab,
            app_tab,
        }
    }

    pub(crate) fn table(&self, context: ExecutionContext) -> &CommandTable {
        match context {
            ExecutionContext::Background => &self.background,
            ExecutionContext::GlobalInjected => &self.injected,
            ExecutionContext::ApplicationPage => &self.application,
        }
    }

    /// Settings as persisted, bypassing dispatch.
    pub(crate) fn stored_settings(&self) -> Settings {
        serde_json::from_str(&self.store.document().unwrap()).unwrap()
    }
}
