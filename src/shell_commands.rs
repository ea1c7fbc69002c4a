use url::Url;

use crate::window_registry::{TabGroupId, WindowId, WindowRole};

/// Everything that varies between the windows the shell creates.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub id: WindowId,
    pub role: WindowRole,
    pub url: String,
    pub visible: bool,
    pub user_agent: Option<String>,
    pub proxy: Option<Url>,
    pub zoom_factor: f64,
    pub tab_group: Option<TabGroupId>,
    /// Hand the built window back to the webview that asked for a popup.
    pub adopt_popup: bool,
}

/// Side effects produced by the orchestrator. Only the host runs them.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    CreateWindow(WindowSpec),
    Destroy { window: WindowId },
    Show { window: WindowId },
    Hide { window: WindowId },
    Focus { window: WindowId },
    SetFullscreen { window: WindowId, fullscreen: bool },
    Maximize { window: WindowId },
    PersistConsumedMaximize,
    SetZoom { window: WindowId, factor: f64 },
    SetPinchZoomLimits { window: WindowId, min: f64, max: f64 },
    InsertCss { window: WindowId, css: String },
    ApplyUserAgent { window: WindowId, user_agent: String },
    Reload { window: WindowId },
    GoBack { window: WindowId },
    GoForward { window: WindowId },
    ClearCache { window: WindowId },
    ConfirmClearAppData,
    CopyText { window: WindowId, text: String },
    OpenExternal { url: String },
    SetBadge { label: Option<String> },
    RequestAttention,
    EmitParams { window: WindowId, payload: String },
    BeginUserAgentLookup,
    Exit,
}

/// Whether the platform's default handling of the event should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventVerdict {
    Proceed,
    PreventDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub verdict: EventVerdict,
    pub commands: Vec<ShellCommand>,
}

impl Dispatch {
    pub fn proceed() -> Self {
        Self {
            verdict: EventVerdict::Proceed,
            commands: Vec::new(),
        }
    }

    pub fn prevent() -> Self {
        Self {
            verdict: EventVerdict::PreventDefault,
            commands: Vec::new(),
        }
    }

    pub fn with(mut self, commands: impl IntoIterator<Item = ShellCommand>) -> Self {
        self.commands.extend(commands);
        self
    }

    #[cfg(test)]
    pub fn is_prevented(&self) -> bool {
        self.verdict == EventVerdict::PreventDefault
    }
}
