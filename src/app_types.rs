use std::{collections::HashMap, path::PathBuf, sync::Mutex};

use tauri::menu::MenuItem;

use crate::{options::Options, orchestrator::Orchestrator, window_registry::WindowId};

#[derive(Clone)]
pub(crate) struct TrayMenuState {
    pub(crate) toggle_item: MenuItem<tauri::Wry>,
    pub(crate) quit_item: MenuItem<tauri::Wry>,
}

/// Managed state shared by the host, the bridge commands and the tray.
pub(crate) struct ShellState {
    pub(crate) orchestrator: Mutex<Orchestrator>,
    /// Options as loaded; the window baseline every spec is layered on.
    pub(crate) options: Options,
    pub(crate) config_path: PathBuf,
    /// Agents applied after a window was built; reapplied on each page load.
    pub(crate) user_agent_overrides: Mutex<HashMap<WindowId, String>>,
}

impl ShellState {
    pub(crate) fn new(orchestrator: Orchestrator, options: Options, config_path: PathBuf) -> Self {
        Self {
            orchestrator: Mutex::new(orchestrator),
            options,
            config_path,
            user_agent_overrides: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn user_agent_override(&self, window: WindowId) -> Option<String> {
        self.user_agent_overrides
            .lock()
            .ok()
            .and_then(|overrides| overrides.get(&window).cloned())
    }

    pub(crate) fn set_user_agent_override(&self, window: WindowId, user_agent: String) {
        if let Ok(mut overrides) = self.user_agent_overrides.lock() {
            overrides.insert(window, user_agent);
        }
    }

    pub(crate) fn forget_window(&self, window: WindowId) {
        if let Ok(mut overrides) = self.user_agent_overrides.lock() {
            overrides.remove(&window);
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

impl BridgeResult {
    pub(crate) fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}
