use regex::Regex;
use url::Url;

use crate::{errors::ShellError, window_registry::WindowId, ABOUT_BLANK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Internal,
    External,
}

/// `url` is internal when it shares the target's host or matches any pattern.
pub fn classify(url: &str, target_url: &str, internal_patterns: &[Regex]) -> Classification {
    if internal_patterns.iter().any(|pattern| pattern.is_match(url)) {
        return Classification::Internal;
    }

    let host_of = |raw: &str| {
        Url::parse(raw)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
    };
    match (host_of(url), host_of(target_url)) {
        (Some(host), Some(target_host)) if host == target_host => Classification::Internal,
        _ => Classification::External,
    }
}

#[derive(Debug, Clone)]
pub struct InternalMatcher {
    target_url: String,
    patterns: Vec<Regex>,
}

impl InternalMatcher {
    /// Patterns that fail to compile are logged and skipped; the rest still apply.
    pub fn new(target_url: &str, patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| match compile_pattern(pattern) {
                Ok(regex) => Some(regex),
                Err(error) => {
                    tracing::warn!(event = "shell.navigation.pattern_ignored", error = %error);
                    None
                }
            })
            .collect();
        Self {
            target_url: target_url.to_string(),
            patterns,
        }
    }

    pub fn classify(&self, url: &str) -> Classification {
        classify(url, &self.target_url, &self.patterns)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ShellError> {
    Regex::new(pattern).map_err(|source| ShellError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    SameWindow,
    ForegroundTab,
    BackgroundTab,
    NewWindow,
    Unspecified,
}

impl Disposition {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "default" | "same-window" => Disposition::SameWindow,
            "foreground-tab" => Disposition::ForegroundTab,
            "background-tab" => Disposition::BackgroundTab,
            "new-window" => Disposition::NewWindow,
            _ => Disposition::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// A link followed inside the current page.
    InPage,
    /// `window.open`, `target=_blank`, or a bridge "open in new ..." request.
    NewWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub url: String,
    pub origin: WindowId,
    pub disposition: Disposition,
    pub kind: NavigationKind,
    /// The webview is waiting for a window it can hand the popup to.
    pub script_opened: bool,
}

impl NavigationRequest {
    pub fn in_page(origin: WindowId, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin,
            disposition: Disposition::SameWindow,
            kind: NavigationKind::InPage,
            script_opened: false,
        }
    }

    pub fn new_window(origin: WindowId, url: impl Into<String>, disposition: Disposition) -> Self {
        Self {
            url: url.into(),
            origin,
            disposition,
            kind: NavigationKind::NewWindow,
            script_opened: false,
        }
    }

    pub fn script_opened(mut self) -> Self {
        self.script_opened = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPlacement {
    Foreground,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadInPlace,
    OpenTab(TabPlacement),
    OpenWindow,
    HandToSystemBrowser,
    ProbeThenDecide,
}

pub fn route(
    request: &NavigationRequest,
    classification: Classification,
    supports_native_tabs: bool,
) -> Action {
    match (request.kind, classification) {
        (NavigationKind::InPage, Classification::External) => {
            if is_about_url(&request.url) {
                Action::LoadInPlace
            } else {
                Action::HandToSystemBrowser
            }
        }
        (NavigationKind::InPage, Classification::Internal) => Action::LoadInPlace,
        (NavigationKind::NewWindow, Classification::External) => {
            if request.url == ABOUT_BLANK {
                Action::ProbeThenDecide
            } else {
                Action::HandToSystemBrowser
            }
        }
        (NavigationKind::NewWindow, Classification::Internal) if supports_native_tabs => {
            if request.disposition == Disposition::BackgroundTab {
                Action::OpenTab(TabPlacement::Background)
            } else {
                Action::OpenTab(TabPlacement::Foreground)
            }
        }
        (NavigationKind::NewWindow, Classification::Internal) => Action::OpenWindow,
    }
}

fn is_about_url(url: &str) -> bool {
    url.get(..6)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("about:"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Closed,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Created,
    Loading,
    Resolved(ProbeOutcome),
}

impl ProbeState {
    pub fn is_unresolved(self) -> bool {
        !matches!(self, ProbeState::Resolved(_))
    }

    pub fn on_load_started(self) -> Self {
        match self {
            ProbeState::Created => ProbeState::Loading,
            other => other,
        }
    }

    /// Resolves on the first load completion; later completions change nothing.
    pub fn on_load_finished(self, final_url: &str) -> (Self, Option<ProbeOutcome>) {
        match self {
            ProbeState::Created | ProbeState::Loading => {
                let outcome = if final_url == ABOUT_BLANK {
                    ProbeOutcome::Closed
                } else {
                    ProbeOutcome::Visible
                };
                (ProbeState::Resolved(outcome), Some(outcome))
            }
            resolved => (resolved, None),
        }
    }
}
