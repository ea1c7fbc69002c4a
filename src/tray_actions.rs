use crate::menu_actions::MenuAction;
use crate::orchestrator::ShellEvent;

pub const TRAY_MENU_TOGGLE_WINDOW: &str = "tray_toggle_window";
pub const TRAY_MENU_QUIT: &str = "tray_quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    ToggleWindow,
    Quit,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    match menu_id {
        TRAY_MENU_TOGGLE_WINDOW => Some(TrayMenuAction::ToggleWindow),
        TRAY_MENU_QUIT => Some(TrayMenuAction::Quit),
        _ => None,
    }
}

/// Tray quit shares the application menu's quit path.
pub fn event_for_action(action: TrayMenuAction) -> ShellEvent {
    match action {
        TrayMenuAction::ToggleWindow => ShellEvent::ToggleVisibility,
        TrayMenuAction::Quit => ShellEvent::Menu(MenuAction::Quit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_from_menu_id_maps_all_known_actions() {
        assert_eq!(
            action_from_menu_id(TRAY_MENU_TOGGLE_WINDOW),
            Some(TrayMenuAction::ToggleWindow)
        );
        assert_eq!(
            action_from_menu_id(TRAY_MENU_QUIT),
            Some(TrayMenuAction::Quit)
        );
    }

    #[test]
    fn action_from_menu_id_returns_none_for_unknown_menu_id() {
        assert_eq!(action_from_menu_id("unknown-menu"), None);
    }

    #[test]
    fn tray_actions_map_to_shell_events() {
        assert_eq!(
            event_for_action(TrayMenuAction::ToggleWindow),
            ShellEvent::ToggleVisibility
        );
        assert_eq!(
            event_for_action(TrayMenuAction::Quit),
            ShellEvent::Menu(MenuAction::Quit)
        );
    }
}
