use tauri::{menu::MenuItem, AppHandle, Manager};

use crate::{shell_locale, tray_actions, window_registry::WindowId, TrayMenuState};

fn set_menu_text_safe(item: &MenuItem<tauri::Wry>, text: &str, item_name: &str) {
    if let Err(error) = item.set_text(text) {
        tracing::warn!(
            event = "shell.tray.label_update_failed",
            item = item_name,
            error = %error
        );
    }
}

pub fn toggle_label(texts: &shell_locale::ShellTexts, app_name: &str, visible: bool) -> String {
    let verb = if visible {
        texts.tray_hide
    } else {
        texts.tray_show
    };
    format!("{verb} {app_name}")
}

/// Refreshes tray labels. `visible_override` wins over the window's reported state,
/// which lags behind a show/hide that was just issued.
pub fn update_tray_menu_labels(app_handle: &AppHandle, app_name: &str, visible_override: Option<bool>) {
    let Some(tray_state) = app_handle.try_state::<TrayMenuState>() else {
        return;
    };

    let texts = shell_locale::current_shell_texts();
    let visible = visible_override.unwrap_or_else(|| {
        app_handle
            .get_webview_window(&WindowId::PRIMARY.label())
            .and_then(|window| window.is_visible().ok())
            .unwrap_or(true)
    });

    set_menu_text_safe(
        &tray_state.toggle_item,
        &toggle_label(&texts, app_name, visible),
        tray_actions::TRAY_MENU_TOGGLE_WINDOW,
    );
    set_menu_text_safe(
        &tray_state.quit_item,
        texts.tray_quit,
        tray_actions::TRAY_MENU_QUIT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_label_follows_visibility() {
        let texts = shell_locale::shell_texts_for_locale("en-US");
        assert_eq!(toggle_label(&texts, "Mail", true), "Hide Mail");
        assert_eq!(toggle_label(&texts, "Mail", false), "Show Mail");
    }
}
