//! Callback table handed to the menu presentation. The ids are shared by the
//! application menu and the bridge so both end up in the same dispatch.

use serde::Serialize;

pub const MENU_QUIT: &str = "menu_quit";
pub const MENU_ZOOM_IN: &str = "menu_zoom_in";
pub const MENU_ZOOM_OUT: &str = "menu_zoom_out";
pub const MENU_ZOOM_RESET: &str = "menu_zoom_reset";
pub const MENU_GO_BACK: &str = "menu_go_back";
pub const MENU_GO_FORWARD: &str = "menu_go_forward";
pub const MENU_COPY_CURRENT_URL: &str = "menu_copy_current_url";
pub const MENU_CLEAR_APP_DATA: &str = "menu_clear_app_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Quit,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    GoBack,
    GoForward,
    CopyCurrentUrl,
    ClearAppData,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<MenuAction> {
    match menu_id {
        MENU_QUIT => Some(MenuAction::Quit),
        MENU_ZOOM_IN => Some(MenuAction::ZoomIn),
        MENU_ZOOM_OUT => Some(MenuAction::ZoomOut),
        MENU_ZOOM_RESET => Some(MenuAction::ZoomReset),
        MENU_GO_BACK => Some(MenuAction::GoBack),
        MENU_GO_FORWARD => Some(MenuAction::GoForward),
        MENU_COPY_CURRENT_URL => Some(MenuAction::CopyCurrentUrl),
        MENU_CLEAR_APP_DATA => Some(MenuAction::ClearAppData),
        _ => None,
    }
}

/// Static data shown alongside the callbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuContext {
    pub app_name: String,
    pub version: String,
    pub build_zoom: f64,
    pub dev_tools_disabled: bool,
}
