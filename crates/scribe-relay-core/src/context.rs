use std::fmt;

use serde::{Deserialize, Serialize};

/// The isolated places code can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionContext {
    /// The privileged background process.
    Background,
    /// The script injected into every page.
    GlobalInjected,
    /// The dedicated long-lived application page.
    ApplicationPage,
}

impl ExecutionContext {
    /// Every context, in dependency order.
    pub const ALL: [ExecutionContext; 3] = [
        ExecutionContext::Background,
        ExecutionContext::GlobalInjected,
        ExecutionContext::ApplicationPage,
    ];

    /// Stable name used in logs and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionContext::Background => "background",
            ExecutionContext::GlobalInjected => "globalInjected",
            ExecutionContext::ApplicationPage => "applicationPage",
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-assigned identifier of an open page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u64);

impl TabId {
    /// Wrap a raw host identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab:{}", self.0)
    }
}

/// Stable handle to the single application page instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerHandle(TabId);

impl PeerHandle {
    pub(crate) const fn new(tab: TabId) -> Self {
        Self(tab)
    }

    /// The page hosting the application context.
    pub const fn tab(self) -> TabId {
        self.0
    }
}

/// Where the transport delivers an envelope.
///
/// A page can host more than one context, so a tab address names the
/// context it is meant for as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The background process.
    Background,
    /// One context running in a page.
    Tab {
        /// The page.
        tab: TabId,
        /// The context inside it.
        context: ExecutionContext,
    },
}

impl Destination {
    /// The address of `context` running in `tab`.
    pub const fn tab(tab: TabId, context: ExecutionContext) -> Self {
        Destination::Tab { tab, context }
    }

    /// The context this address reaches.
    pub const fn context(self) -> ExecutionContext {
        match self {
            Destination::Background => ExecutionContext::Background,
            Destination::Tab { context, .. } => context,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Background => f.write_str("background"),
            Destination::Tab { tab, context } => write!(f, "{tab}/{context}"),
        }
    }
}
