use crate::{
    CancelRecording, Command, ExecutionContext, GetCurrentTabId, GetSettings, OpenOptionsPage,
    SendErrorToast, SetSettings, ToggleRecording,
};

use ExecutionContext::{ApplicationPage, Background, GlobalInjected};

/// How a shim reaches the command's native context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimRoute {
    /// Send to the background process.
    Background,
    /// Ask for the active tab, then send to the script injected in it.
    ActiveTab,
    /// Locate (or create) the application page, then send to it.
    ApplicationPage,
}

/// Static routing entry for one command.
#[derive(Debug)]
pub struct CommandSpec {
    /// Catalog and wire name.
    pub name: &'static str,
    /// The one context that runs the real implementation.
    pub native: ExecutionContext,
    /// Shim per non-native calling context.
    pub shims: &'static [(ExecutionContext, ShimRoute)],
}

impl CommandSpec {
    /// The shim for `caller`, if one is defined.
    pub fn shim_for(&self, caller: ExecutionContext) -> Option<ShimRoute> {
        self.shims
            .iter()
            .find(|(context, _)| *context == caller)
            .map(|(_, route)| *route)
    }
}

/// Every command, its native context, and the contexts it can be called from.
pub const CATALOG: &[CommandSpec] = &[
    CommandSpec {
        name: OpenOptionsPage::NAME,
        native: OpenOptionsPage::NATIVE,
        shims: &[
            (GlobalInjected, ShimRoute::Background),
            (ApplicationPage, ShimRoute::Background),
        ],
    },
    CommandSpec {
        name: GetCurrentTabId::NAME,
        native: GetCurrentTabId::NATIVE,
        shims: &[
            (GlobalInjected, ShimRoute::Background),
            (ApplicationPage, ShimRoute::Background),
        ],
    },
    CommandSpec {
        name: GetSettings::NAME,
        native: GetSettings::NATIVE,
        shims: &[
            (Background, ShimRoute::ApplicationPage),
            (GlobalInjected, ShimRoute::ApplicationPage),
        ],
    },
    CommandSpec {
        name: SetSettings::NAME,
        native: SetSettings::NATIVE,
        shims: &[
            (Background, ShimRoute::ApplicationPage),
            (GlobalInjected, ShimRoute::ApplicationPage),
        ],
    },
    CommandSpec {
        name: ToggleRecording::NAME,
        native: ToggleRecording::NATIVE,
        shims: &[(Background, ShimRoute::ActiveTab)],
    },
    CommandSpec {
        name: CancelRecording::NAME,
        native: CancelRecording::NATIVE,
        shims: &[(Background, ShimRoute::ActiveTab)],
    },
    CommandSpec {
        name: SendErrorToast::NAME,
        native: SendErrorToast::NATIVE,
        shims: &[
            (Background, ShimRoute::ActiveTab),
            (ApplicationPage, ShimRoute::ActiveTab),
        ],
    },
];

/// Catalog entry for `name`.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}
