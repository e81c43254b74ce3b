use crate::{
    AppError, AppResult, ApplicationPageSeed, Browser, ConsoleCommand, CpalCapture, CpalInputs,
    DesktopNotifier, FileSettingsStore, ToneFeedback, config::Config,
    console_command::CONSOLE_HELP,
};

use scribe_relay_core::{
    CancelRecording, CommandTable, CommandTableBuilder, Destination, ErrorToast, ExecutionContext, GetSettings,
    InProcessBus, MemoryStateStore, Notifier, Recorder, RecorderPorts, SendErrorToast,
    SetSettings, Settings, SettingsStore, TabId, ToggleRecording, Transition, background,
    global_injected,
};

use std::{panic::Location, path::PathBuf, sync::Arc};

use error_location::ErrorLocation;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, instrument, warn};

/// The relay host.
///
/// Owns the background context and the tab the injected context runs in.
/// The application page context is started by the browser the first time a
/// command needs it. Console input is dispatched from the background context.
pub struct App {
    pub(crate) bus: Arc<InProcessBus>,
    pub(crate) browser: Arc<Browser>,
    pub(crate) background: Arc<CommandTable>,
    pub(crate) injected_tab: TabId,
}

impl App {
    /// Start the background and injected contexts.
    ///
    /// The settings document lives at `settings_path`; it doubles as the
    /// configuration surface when no options page address is configured.
    #[track_caller]
    #[instrument(skip(config))]
    pub(crate) fn start(config: &Config, settings_path: PathBuf) -> AppResult<Self> {
        let bus = Arc::new(InProcessBus::new());
        let options_target = config.pages.options_target(&settings_path);
        let settings: Arc<dyn SettingsStore> = Arc::new(FileSettingsStore::new(settings_path));

        let browser = Browser::new(
            ApplicationPageSeed {
                bus: bus.clone(),
                settings,
                timeout: config.transport.timeout(),
                application_url: config.pages.application_url.clone(),
            },
            options_target,
        );

        let background_table = Arc::new(background(
            Self::builder(&browser, ExecutionContext::Background)?,
            browser.clone(),
        )?);
        drop(bus.attach(Destination::Background, background_table.clone())?);

        let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier);
        let recorder = Arc::new(Recorder::new(RecorderPorts {
            capture: Arc::new(CpalCapture::new()),
            devices: Arc::new(CpalInputs),
            feedback: Arc::new(ToneFeedback),
            notifier: notifier.clone(),
            state: Arc::new(MemoryStateStore::new()),
        }));

        let injected_tab = browser.open_page(&config.pages.start_url);
        browser.focus(injected_tab);

        let injected_table = global_injected(
            Self::builder(&browser, ExecutionContext::GlobalInjected)?,
            recorder,
            notifier,
        )?;
        drop(bus.attach(
            Destination::tab(injected_tab, ExecutionContext::GlobalInjected),
            Arc::new(injected_table),
        )?);

        info!(%injected_tab, "Execution contexts started");

        Ok(Self {
            bus,
            browser,
            background: background_table,
            injected_tab,
        })
    }

    /// Run the console loop until `quit`, end of input, or Ctrl+C.
    #[instrument(skip(self))]
    pub(crate) async fn run(self) -> AppResult<()> {
        info!("Scribe-Relay starting");
        println!("{CONSOLE_HELP}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Console input closed, shutting down");
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    match line.parse::<ConsoleCommand>() {
                        Ok(ConsoleCommand::Quit) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Ok(command) => self.execute(command).await,
                        Err(e) => {
                            warn!(error = %e, "Unrecognised console input");
                            println!("{CONSOLE_HELP}");
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        self.bus.detach(Destination::tab(
            self.injected_tab,
            ExecutionContext::GlobalInjected,
        ));
        self.bus.detach(Destination::Background);
        info!("Scribe-Relay shut down successfully");

        Ok(())
    }

    /// Run one console command, reporting failures to the active tab.
    #[instrument(skip(self))]
    async fn execute(&self, command: ConsoleCommand) {
        if let Err(e) = self.dispatch(&command).await {
            error!(error = %e, ?command, "Console command failed");

            // The recorder already prompted for configuration itself.
            if matches!(&e, AppError::Dispatch { source, .. } if source.is_configuration()) {
                return;
            }

            let toast = ErrorToast {
                message: format!("{command:?} failed"),
                detail: Some(e.to_string()),
            };
            if let Err(e) = self.background.invoke::<SendErrorToast>(toast).await {
                warn!(error = %e, "Failed to forward error toast");
            }
        }
    }

    async fn dispatch(&self, command: &ConsoleCommand) -> AppResult<()> {
        match command {
            ConsoleCommand::Toggle => {
                let transition = self.background.invoke::<ToggleRecording>(()).await?;
                match transition {
                    Transition::Started => println!("recording"),
                    Transition::Stopped => println!("stopped"),
                    Transition::Ignored => println!("ignored: recorder state unrecognised"),
                }
            }
            ConsoleCommand::Cancel => {
                self.background.invoke::<CancelRecording>(()).await?;
                println!("cancelled");
            }
            ConsoleCommand::ShowSettings => {
                let settings = self.background.invoke::<GetSettings>(()).await?;
                print_settings(&settings);
            }
            ConsoleCommand::SetApiKey { key } => {
                self.update_settings(|s| s.api_key = key.clone()).await?;
            }
            ConsoleCommand::SelectDevice { device_id } => {
                self.update_settings(|s| s.selected_device_id = device_id.clone())
                    .await?;
            }
            ConsoleCommand::Sound { enabled } => {
                self.update_settings(|s| s.sound_on_toggle = *enabled).await?;
            }
            ConsoleCommand::Help => println!("{CONSOLE_HELP}"),
            ConsoleCommand::Quit => {}
        }

        Ok(())
    }

    async fn update_settings(&self, edit: impl FnOnce(&mut Settings)) -> AppResult<()> {
        let mut settings = self.background.invoke::<GetSettings>(()).await?;
        edit(&mut settings);
        self.background.invoke::<SetSettings>(settings).await?;
        println!("saved");
        Ok(())
    }

    #[track_caller]
    fn builder(
        browser: &Browser,
        context: ExecutionContext,
    ) -> AppResult<CommandTableBuilder> {
        browser
            .table_builder(context)
            .ok_or_else(|| AppError::ConfigError {
                reason: format!("Browser dropped before {context} started"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

fn print_settings(settings: &Settings) {
    let credential = if settings.has_credential() { "set" } else { "not set" };
    println!("  api key:         {credential}");
    println!("  device:          {}", settings.selected_device_id);
    println!("  sound:           {}", settings.sound_on_toggle);
    println!("  copy:            {}", settings.copy_to_clipboard);
    println!("  paste:           {}", settings.paste_on_success);
    println!("  local shortcut:  {}", settings.local_shortcut);
    println!("  global shortcut: {}", settings.global_shortcut);
    println!("  language:        {}", settings.output_language);
}
