use tauri::{AppHandle, Manager, WebviewWindow};

use crate::{
    menu_actions::{self, MenuContext},
    navigation_policy::{Disposition, NavigationRequest},
    orchestrator::ShellEvent,
    shell_host,
    window_registry::WindowId,
    BridgeResult, ShellState,
};

fn window_id(window: &WebviewWindow) -> Option<WindowId> {
    WindowId::from_label(window.label())
}

fn with_state<T>(app_handle: &AppHandle, read: impl FnOnce(&ShellState) -> T) -> Option<T> {
    app_handle.try_state::<ShellState>().map(|state| read(&state))
}

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) async fn desktop_bridge_notification(
    app_handle: AppHandle,
    title: String,
    body: Option<String>,
) -> BridgeResult {
    tracing::debug!(
        event = "shell.bridge.notification",
        title = %title,
        has_body = body.is_some()
    );
    shell_host::handle_event_on_main_thread(&app_handle, ShellEvent::NotificationReceived);
    BridgeResult::ok()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_notification_click(app_handle: AppHandle) -> BridgeResult {
    shell_host::handle_event_on_main_thread(&app_handle, ShellEvent::NotificationClicked);
    BridgeResult::ok()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_document_ready(
    app_handle: AppHandle,
    webview_window: WebviewWindow,
) -> BridgeResult {
    let Some(window) = window_id(&webview_window) else {
        return BridgeResult::failed("Unknown window.");
    };
    shell_host::handle_event_on_main_thread(&app_handle, ShellEvent::FirstResponse { window });
    BridgeResult::ok()
}

/// Links the page opened with a modifier key, middle click, or context menu.
#[tauri::command]
pub(crate) async fn desktop_bridge_open_link(
    app_handle: AppHandle,
    webview_window: WebviewWindow,
    url: String,
    disposition: Option<String>,
) -> BridgeResult {
    let Some(window) = window_id(&webview_window) else {
        return BridgeResult::failed("Unknown window.");
    };
    if url.trim().is_empty() {
        return BridgeResult::failed("Missing URL.");
    }
    let disposition = disposition
        .as_deref()
        .map(Disposition::from_name)
        .unwrap_or(Disposition::Unspecified);
    let request = NavigationRequest::new_window(window, url.trim(), disposition);
    shell_host::handle_event_on_main_thread(&app_handle, ShellEvent::NavigationRequested(request));
    BridgeResult::ok()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_menu_action(
    app_handle: AppHandle,
    menu_id: String,
) -> BridgeResult {
    let Some(action) = menu_actions::action_from_menu_id(&menu_id) else {
        return BridgeResult::failed(format!("Unknown menu action '{menu_id}'."));
    };
    shell_host::handle_event_on_main_thread(&app_handle, ShellEvent::Menu(action));
    BridgeResult::ok()
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_current_url(app_handle: AppHandle) -> Option<String> {
    with_state(&app_handle, |state| {
        state
            .orchestrator
            .lock()
            .ok()
            .map(|orchestrator| orchestrator.current_url())
    })
    .flatten()
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_menu_context(app_handle: AppHandle) -> Option<MenuContext> {
    with_state(&app_handle, |state| {
        state
            .orchestrator
            .lock()
            .ok()
            .map(|orchestrator| orchestrator.menu_context())
    })
    .flatten()
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_params(app_handle: AppHandle) -> Option<serde_json::Value> {
    with_state(&app_handle, |state| serde_json::to_value(&state.options).ok()).flatten()
}
