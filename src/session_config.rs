use url::Url;

use crate::{
    errors::ShellError,
    options::{Options, UserAgentSetting},
    PINCH_ZOOM_MAX, PINCH_ZOOM_MIN, ZOOM_STEP,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentState {
    setting: UserAgentSetting,
    resolved: Option<String>,
    generation: u64,
    lookup_issued: bool,
}

impl UserAgentState {
    pub fn new(setting: UserAgentSetting) -> Self {
        Self {
            setting,
            resolved: None,
            generation: 0,
            lookup_issued: false,
        }
    }

    /// Agent for a window created right now. `None` keeps the engine default.
    pub fn for_new_window(&self) -> Option<String> {
        match &self.setting {
            UserAgentSetting::EngineDefault => None,
            UserAgentSetting::Literal(value) => Some(value.clone()),
            UserAgentSetting::Auto => self.resolved.clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True exactly once, and only for the `auto` setting.
    pub fn begin_lookup(&mut self) -> bool {
        if self.setting != UserAgentSetting::Auto || self.lookup_issued {
            return false;
        }
        self.lookup_issued = true;
        true
    }

    /// Caches the looked-up agent and bumps the generation. Repeat results are ignored.
    pub fn resolve(&mut self, user_agent: String) -> Option<u64> {
        if self.setting != UserAgentSetting::Auto || self.resolved.is_some() {
            return None;
        }
        self.resolved = Some(user_agent);
        self.generation += 1;
        Some(self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CssInjection {
    #[default]
    Idle,
    Armed,
    Injected,
}

impl CssInjection {
    pub fn on_did_navigate(&mut self) {
        *self = CssInjection::Armed;
    }

    pub fn on_first_response(&mut self) -> bool {
        if *self == CssInjection::Armed {
            *self = CssInjection::Injected;
            return true;
        }
        false
    }

    /// Removes the hook. Inserts late if no response signal arrived.
    pub fn on_did_finish_load(&mut self) -> bool {
        let insert = *self == CssInjection::Armed;
        *self = CssInjection::Idle;
        insert
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfigurator {
    base_zoom: f64,
    proxy: Option<Url>,
    css: Option<String>,
    user_agent: UserAgentState,
}

impl SessionConfigurator {
    pub fn from_options(options: &Options) -> Self {
        let proxy = options
            .proxy_rules
            .as_deref()
            .filter(|rules| !rules.trim().is_empty())
            .and_then(|rules| match parse_proxy_rules(rules) {
                Ok(url) => Some(url),
                Err(error) => {
                    tracing::warn!(event = "shell.session.proxy_ignored", error = %error);
                    None
                }
            });
        let css = options
            .css
            .clone()
            .filter(|css| !css.trim().is_empty());

        Self {
            base_zoom: options.base_zoom(),
            proxy,
            css,
            user_agent: UserAgentState::new(options.user_agent_setting()),
        }
    }

    pub fn base_zoom(&self) -> f64 {
        self.base_zoom
    }

    pub fn proxy(&self) -> Option<&Url> {
        self.proxy.as_ref()
    }

    pub fn css(&self) -> Option<&str> {
        self.css.as_deref()
    }

    pub fn user_agent(&self) -> &UserAgentState {
        &self.user_agent
    }

    pub fn user_agent_mut(&mut self) -> &mut UserAgentState {
        &mut self.user_agent
    }

    pub fn zoom_in(&self, current: f64) -> f64 {
        current + ZOOM_STEP
    }

    pub fn zoom_out(&self, current: f64) -> f64 {
        current - ZOOM_STEP
    }

    pub fn zoom_reset(&self) -> f64 {
        self.base_zoom
    }

    pub fn pinch_zoom_limits(&self) -> (f64, f64) {
        (PINCH_ZOOM_MIN, PINCH_ZOOM_MAX)
    }
}

/// Reduces a `proxyRules` string to the single proxy URL the webview accepts.
///
/// Accepts `host:port`, `scheme://host:port` and `urlScheme=proxy` entries,
/// separated by `;` (rules) and `,` (fallbacks). The first usable entry wins.
pub fn parse_proxy_rules(rules: &str) -> Result<Url, ShellError> {
    let invalid = |message: &str| ShellError::InvalidProxyRules {
        rules: rules.to_string(),
        message: message.to_string(),
    };

    let candidate = rules
        .split(';')
        .flat_map(|rule| {
            let proxies = rule.split_once('=').map_or(rule, |(_, proxies)| proxies);
            proxies.split(',')
        })
        .map(str::trim)
        .find(|entry| !entry.is_empty() && !entry.eq_ignore_ascii_case("direct://"))
        .ok_or_else(|| invalid("no proxy entry"))?;

    let with_scheme = if candidate.contains("://") {
        candidate.to_string()
    } else {
        format!("http://{candidate}")
    };
    let parsed = Url::parse(&with_scheme).map_err(|error| invalid(&error.to_string()))?;
    match parsed.scheme() {
        "http" | "socks5" => {}
        scheme => return Err(invalid(&format!("unsupported proxy scheme '{scheme}'"))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing proxy host"));
    }
    Ok(parsed)
}
