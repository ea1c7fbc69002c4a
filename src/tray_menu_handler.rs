use tauri::AppHandle;

use crate::{shell_host, tray_actions};

pub fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    let Some(action) = tray_actions::action_from_menu_id(menu_id) else {
        tracing::debug!(event = "shell.tray.unknown_menu_id", menu_id);
        return;
    };
    tracing::info!(event = "shell.tray.menu_selected", action = ?action);
    shell_host::handle_event(app_handle, tray_actions::event_for_action(action));
}

pub fn handle_tray_click(app_handle: &AppHandle) {
    shell_host::handle_event(
        app_handle,
        tray_actions::event_for_action(tray_actions::TrayMenuAction::ToggleWindow),
    );
}
