use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::errors::ShellError;

const DEFAULT_WIDTH: f64 = 1280.0;
const DEFAULT_HEIGHT: f64 = 800.0;
const AUTO_USER_AGENT: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrayMode {
    #[default]
    Disabled,
    StartVisible,
    StartInTray,
}

impl TrayMode {
    pub fn is_enabled(self) -> bool {
        self != TrayMode::Disabled
    }
}

impl<'de> Deserialize<'de> for TrayMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTray {
            Flag(bool),
            Mode(String),
        }

        Ok(match Option::<RawTray>::deserialize(deserializer)? {
            None | Some(RawTray::Flag(false)) => TrayMode::Disabled,
            Some(RawTray::Flag(true)) => TrayMode::StartVisible,
            Some(RawTray::Mode(mode)) => match mode.trim() {
                "start-in-tray" => TrayMode::StartInTray,
                "" | "false" => TrayMode::Disabled,
                _ => TrayMode::StartVisible,
            },
        })
    }
}

impl Serialize for TrayMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TrayMode::Disabled => serializer.serialize_bool(false),
            TrayMode::StartVisible => serializer.serialize_bool(true),
            TrayMode::StartInTray => serializer.serialize_str("start-in-tray"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InternalUrls {
    One(String),
    Many(Vec<String>),
}

impl InternalUrls {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            InternalUrls::One(pattern) => vec![pattern.as_str()],
            InternalUrls::Many(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgentSetting {
    EngineDefault,
    Literal(String),
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub name: String,
    pub title: Option<String>,
    pub target_url: String,
    pub internal_urls: Option<InternalUrls>,

    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub always_on_top: bool,
    pub title_bar_style: Option<String>,
    pub full_screen: bool,
    /// One-shot: cleared and written back after the first run applies it.
    pub maximize: bool,
    pub background_color: Option<String>,
    pub hide_window_frame: bool,
    pub show_menu_bar: bool,

    pub tray: TrayMode,
    pub fast_quit: bool,
    pub clear_cache: bool,
    pub single_instance: bool,

    pub zoom: f64,
    pub counter: bool,
    pub counter_pattern: Option<String>,
    pub bounce: bool,
    pub user_agent: Option<String>,
    pub proxy_rules: Option<String>,
    pub css: Option<String>,

    pub disable_dev_tools: bool,
    pub disable_context_menu: bool,
    pub insecure: bool,
    #[serde(rename = "nativefierVersion")]
    pub shell_version: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            name: "pagewrap".to_string(),
            title: None,
            target_url: String::new(),
            internal_urls: None,
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            x: None,
            y: None,
            always_on_top: false,
            title_bar_style: None,
            full_screen: false,
            maximize: false,
            background_color: None,
            hide_window_frame: false,
            show_menu_bar: false,
            tray: TrayMode::Disabled,
            fast_quit: false,
            clear_cache: false,
            single_instance: false,
            zoom: 1.0,
            counter: false,
            counter_pattern: None,
            bounce: false,
            user_agent: None,
            proxy_rules: None,
            css: None,
            disable_dev_tools: false,
            disable_context_menu: false,
            insecure: false,
            shell_version: None,
        }
    }
}

impl Options {
    pub fn parsed_target_url(&self) -> Result<Url, ShellError> {
        Url::parse(self.target_url.trim()).map_err(|source| ShellError::InvalidTargetUrl {
            url: self.target_url.clone(),
            source,
        })
    }

    pub fn user_agent_setting(&self) -> UserAgentSetting {
        match self.user_agent.as_deref().map(str::trim) {
            None | Some("") => UserAgentSetting::EngineDefault,
            Some(value) if value.eq_ignore_ascii_case(AUTO_USER_AGENT) => UserAgentSetting::Auto,
            Some(value) => UserAgentSetting::Literal(value.to_string()),
        }
    }

    pub fn window_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn initial_size(&self) -> (f64, f64) {
        (
            self.width.unwrap_or(DEFAULT_WIDTH),
            self.height.unwrap_or(DEFAULT_HEIGHT),
        )
    }

    /// Base zoom factor; non-positive values fall back to 1.0.
    pub fn base_zoom(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    pub fn start_hidden(&self) -> bool {
        self.tray == TrayMode::StartInTray
    }
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` into RGBA.
pub fn parse_hex_color(raw: &str) -> Result<(u8, u8, u8, u8), ShellError> {
    let invalid = || ShellError::InvalidColor(raw.to_string());
    let hex = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |slice: &str| u8::from_str_radix(slice, 16).map_err(|_| invalid());

    match hex.len() {
        3 => {
            let expand = |index: usize| channel(&hex[index..index + 1].repeat(2));
            Ok((expand(0)?, expand(1)?, expand(2)?, 255))
        }
        6 => Ok((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 255)),
        8 => Ok((
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => Err(invalid()),
    }
}
