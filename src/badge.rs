use regex::Regex;

use crate::{
    options::Options, shell_commands::ShellCommand, DEFAULT_COUNTER_PATTERN,
    NOTIFICATION_BADGE_MARKER,
};

#[derive(Debug, Clone)]
pub enum BadgeMode {
    Counter { pattern: Regex },
    Notification,
}

#[derive(Debug, Clone)]
pub struct BadgeController {
    mode: BadgeMode,
    bounce: bool,
    current: Option<String>,
}

fn default_counter_pattern() -> Regex {
    Regex::new(DEFAULT_COUNTER_PATTERN)
        .unwrap_or_else(|error| unreachable!("built-in counter pattern is valid: {error}"))
}

impl BadgeController {
    pub fn new(mode: BadgeMode, bounce: bool) -> Self {
        Self {
            mode,
            bounce,
            current: None,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        if !options.counter {
            return Self::new(BadgeMode::Notification, options.bounce);
        }

        let pattern = match options.counter_pattern.as_deref() {
            Some(raw) => Regex::new(raw).unwrap_or_else(|error| {
                tracing::warn!(
                    event = "shell.badge.pattern_invalid",
                    pattern = raw,
                    error = %error
                );
                default_counter_pattern()
            }),
            None => default_counter_pattern(),
        };
        Self::new(BadgeMode::Counter { pattern }, options.bounce)
    }

    #[cfg(test)]
    fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn set(&mut self, label: Option<String>) -> Vec<ShellCommand> {
        let bounce = self.bounce && label.is_some();
        self.current = label.clone();

        let mut commands = vec![ShellCommand::SetBadge { label }];
        if bounce {
            commands.push(ShellCommand::RequestAttention);
        }
        commands
    }

    /// Counter mode only: the primary window's title drives the badge.
    pub fn on_title_changed(&mut self, title: &str) -> Vec<ShellCommand> {
        let BadgeMode::Counter { pattern } = &self.mode else {
            return Vec::new();
        };
        let count = extract_count(pattern, title);
        self.set(count)
    }

    /// Notification mode only: mark the badge while the app is in the background.
    pub fn on_notification(&mut self, app_focused: bool) -> Vec<ShellCommand> {
        if !matches!(self.mode, BadgeMode::Notification) || app_focused {
            return Vec::new();
        }
        self.set(Some(NOTIFICATION_BADGE_MARKER.to_string()))
    }

    pub fn on_primary_focused(&mut self) -> Vec<ShellCommand> {
        if !matches!(self.mode, BadgeMode::Notification) || self.current.is_none() {
            return Vec::new();
        }
        self.set(None)
    }
}

/// First capture group of `pattern` in `title`, or the whole match.
pub fn extract_count(pattern: &Regex, title: &str) -> Option<String> {
    let captures = pattern.captures(title)?;
    let value = captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|found| found.as_str().trim())?;
    (!value.is_empty()).then(|| value.to_string())
}
