use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("No config file found (set PAGEWRAP_CONFIG or ship app-config.json)")]
    ConfigMissing,

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write config {path}: {message}")]
    ConfigWrite { path: PathBuf, message: String },

    #[error("Invalid target URL '{url}': {source}")]
    InvalidTargetUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid URL pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid proxy rules '{rules}': {message}")]
    InvalidProxyRules { rules: String, message: String },

    #[error("Invalid background color '{0}'")]
    InvalidColor(String),

    #[error("User agent lookup failed: {0}")]
    UserAgentLookup(String),

    #[error("Window operation failed on '{label}': {message}")]
    Window { label: String, message: String },
}

impl ShellError {
    pub fn window(label: &str, error: impl std::fmt::Display) -> Self {
        ShellError::Window {
            label: label.to_string(),
            message: error.to_string(),
        }
    }
}
