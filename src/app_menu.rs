use tauri::{
    menu::{Menu, MenuBuilder, MenuItem, MenuItemBuilder, SubmenuBuilder},
    AppHandle, Wry,
};

use crate::{menu_actions, shell_host, shell_locale::ShellTexts};

fn item(
    app_handle: &AppHandle,
    id: &str,
    text: &str,
    accelerator: Option<&str>,
) -> tauri::Result<MenuItem<Wry>> {
    let builder = MenuItemBuilder::with_id(id, text);
    match accelerator {
        Some(accelerator) => builder.accelerator(accelerator).build(app_handle),
        None => builder.build(app_handle),
    }
}

/// Application menu. Every entry routes through the shared menu action ids.
pub fn build_app_menu(app_handle: &AppHandle, texts: &ShellTexts) -> tauri::Result<Menu<Wry>> {
    let app_menu = SubmenuBuilder::new(app_handle, texts.menu_app)
        .item(&item(
            app_handle,
            menu_actions::MENU_CLEAR_APP_DATA,
            texts.menu_clear_app_data,
            None,
        )?)
        .separator()
        .item(&item(
            app_handle,
            menu_actions::MENU_QUIT,
            texts.menu_quit,
            Some("CmdOrCtrl+Q"),
        )?)
        .build()?;

    let edit_menu = SubmenuBuilder::new(app_handle, texts.menu_edit)
        .undo()
        .redo()
        .separator()
        .cut()
        .copy()
        .paste()
        .select_all()
        .separator()
        .item(&item(
            app_handle,
            menu_actions::MENU_COPY_CURRENT_URL,
            texts.menu_copy_current_url,
            Some("CmdOrCtrl+L"),
        )?)
        .build()?;

    let view_menu = SubmenuBuilder::new(app_handle, texts.menu_view)
        .item(&item(
            app_handle,
            menu_actions::MENU_ZOOM_IN,
            texts.menu_zoom_in,
            Some("CmdOrCtrl+="),
        )?)
        .item(&item(
            app_handle,
            menu_actions::MENU_ZOOM_OUT,
            texts.menu_zoom_out,
            Some("CmdOrCtrl+-"),
        )?)
        .item(&item(
            app_handle,
            menu_actions::MENU_ZOOM_RESET,
            texts.menu_zoom_reset,
            Some("CmdOrCtrl+0"),
        )?)
        .build()?;

    let history_menu = SubmenuBuilder::new(app_handle, texts.menu_history)
        .item(&item(
            app_handle,
            menu_actions::MENU_GO_BACK,
            texts.menu_go_back,
            Some("CmdOrCtrl+["),
        )?)
        .item(&item(
            app_handle,
            menu_actions::MENU_GO_FORWARD,
            texts.menu_go_forward,
            Some("CmdOrCtrl+]"),
        )?)
        .build()?;

    MenuBuilder::new(app_handle)
        .items(&[&app_menu, &edit_menu, &view_menu, &history_menu])
        .build()
}

pub fn handle_app_menu_event(app_handle: &AppHandle, menu_id: &str) {
    let Some(action) = menu_actions::action_from_menu_id(menu_id) else {
        return;
    };
    tracing::debug!(event = "shell.menu.selected", action = ?action);
    shell_host::handle_event(app_handle, crate::orchestrator::ShellEvent::Menu(action));
}
