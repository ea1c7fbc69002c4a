pub const PRIMARY_WINDOW_LABEL: &str = "main";
pub const SECONDARY_WINDOW_LABEL_PREFIX: &str = "window-";
pub const TRAY_ID: &str = "pagewrap-tray";

pub const ABOUT_BLANK: &str = "about:blank";

pub const ZOOM_STEP: f64 = 0.1;
pub const PINCH_ZOOM_MIN: f64 = 1.0;
pub const PINCH_ZOOM_MAX: f64 = 3.0;

pub const NOTIFICATION_BADGE_MARKER: &str = "•";
pub const DEFAULT_COUNTER_PATTERN: &str = r"[\(\[{]([\d.,]*)\+?[}\]\)]";

pub const PARAMS_EVENT: &str = "params";

pub const CONFIG_ENV: &str = "PAGEWRAP_CONFIG";
pub const CONFIG_FILE_NAME: &str = "app-config.json";
pub const DATA_DIR_NAME: &str = ".pagewrap";
pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const LOG_FILTER_ENV: &str = "PAGEWRAP_LOG";

pub const DEFAULT_SHELL_LOCALE: &str = "en-US";
