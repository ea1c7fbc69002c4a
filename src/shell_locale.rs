use std::env;

#[derive(Debug, Clone, Copy)]
pub struct ShellTexts {
    pub tray_hide: &'static str,
    pub tray_show: &'static str,
    pub tray_quit: &'static str,
    pub menu_app: &'static str,
    pub menu_edit: &'static str,
    pub menu_view: &'static str,
    pub menu_history: &'static str,
    pub menu_zoom_in: &'static str,
    pub menu_zoom_out: &'static str,
    pub menu_zoom_reset: &'static str,
    pub menu_go_back: &'static str,
    pub menu_go_forward: &'static str,
    pub menu_copy_current_url: &'static str,
    pub menu_clear_app_data: &'static str,
    pub menu_quit: &'static str,
    pub clear_app_data_title: &'static str,
    pub clear_app_data_message: &'static str,
    pub startup_error_title: &'static str,
}

pub fn shell_texts_for_locale(locale: &str) -> ShellTexts {
    if locale == "zh-CN" {
        return ShellTexts {
            tray_hide: "隐藏",
            tray_show: "显示",
            tray_quit: "退出",
            menu_app: "应用",
            menu_edit: "编辑",
            menu_view: "视图",
            menu_history: "历史",
            menu_zoom_in: "放大",
            menu_zoom_out: "缩小",
            menu_zoom_reset: "实际大小",
            menu_go_back: "后退",
            menu_go_forward: "前进",
            menu_copy_current_url: "复制当前网址",
            menu_clear_app_data: "清除应用数据",
            menu_quit: "退出",
            clear_app_data_title: "清除应用数据",
            clear_app_data_message: "将清除所有缓存、Cookie 和本地存储，并重新加载页面。是否继续？",
            startup_error_title: "启动失败",
        };
    }

    ShellTexts {
        tray_hide: "Hide",
        tray_show: "Show",
        tray_quit: "Quit",
        menu_app: "App",
        menu_edit: "Edit",
        menu_view: "View",
        menu_history: "History",
        menu_zoom_in: "Zoom In",
        menu_zoom_out: "Zoom Out",
        menu_zoom_reset: "Actual Size",
        menu_go_back: "Back",
        menu_go_forward: "Forward",
        menu_copy_current_url: "Copy Current URL",
        menu_clear_app_data: "Clear App Data",
        menu_quit: "Quit",
        clear_app_data_title: "Clear App Data",
        clear_app_data_message:
            "This clears all caches, cookies and local storage, then reloads the page. Continue?",
        startup_error_title: "Startup failed",
    }
}

pub fn resolve_shell_locale(default_shell_locale: &'static str) -> &'static str {
    for env_key in ["PAGEWRAP_LOCALE", "LC_ALL", "LANG"] {
        if let Ok(value) = env::var(env_key) {
            if let Some(locale) = normalize_shell_locale(&value) {
                return locale;
            }
        }
    }

    default_shell_locale
}

pub fn current_shell_texts() -> ShellTexts {
    shell_texts_for_locale(resolve_shell_locale(crate::DEFAULT_SHELL_LOCALE))
}

pub(crate) fn normalize_shell_locale(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("zh") {
        return Some("zh-CN");
    }
    if lowered.starts_with("en") {
        return Some("en-US");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_shell_locale_maps_language_prefixes() {
        assert_eq!(normalize_shell_locale("zh_CN.UTF-8"), Some("zh-CN"));
        assert_eq!(normalize_shell_locale("en_GB.UTF-8"), Some("en-US"));
        assert_eq!(normalize_shell_locale(" en-US "), Some("en-US"));
    }

    #[test]
    fn normalize_shell_locale_rejects_unknown_and_empty() {
        assert_eq!(normalize_shell_locale("fr_FR.UTF-8"), None);
        assert_eq!(normalize_shell_locale("   "), None);
        assert_eq!(normalize_shell_locale("C"), None);
    }

    #[test]
    fn unknown_locale_gets_english_texts() {
        assert_eq!(shell_texts_for_locale("de-DE").tray_quit, "Quit");
        assert_eq!(shell_texts_for_locale("zh-CN").tray_quit, "退出");
    }
}
