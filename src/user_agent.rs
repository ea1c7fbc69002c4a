use std::time::Duration;

use serde::Deserialize;

use crate::errors::ShellError;

const CHROME_VERSIONS_URL: &str =
    "https://versionhistory.googleapis.com/v1/chrome/platforms/win/channels/stable/versions";
const FALLBACK_CHROME_VERSION: &str = "126.0.6478.127";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);
const MAX_RESPONSE_SIZE: u64 = 2 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct VersionHistory {
    versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAgentPlatform {
    MacOs,
    Windows,
    Linux,
}

impl UserAgentPlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            UserAgentPlatform::MacOs
        } else if cfg!(target_os = "windows") {
            UserAgentPlatform::Windows
        } else {
            UserAgentPlatform::Linux
        }
    }

    fn os_token(self) -> &'static str {
        match self {
            UserAgentPlatform::MacOs => "Macintosh; Intel Mac OS X 10_15_7",
            UserAgentPlatform::Windows => "Windows NT 10.0; Win64; x64",
            UserAgentPlatform::Linux => "X11; Linux x86_64",
        }
    }
}

/// Picks the newest stable version from a version-history response.
pub fn parse_chrome_version(body: &str) -> Result<String, ShellError> {
    let history: VersionHistory = serde_json::from_str(body)
        .map_err(|error| ShellError::UserAgentLookup(format!("bad response: {error}")))?;
    history
        .versions
        .into_iter()
        .map(|entry| entry.version)
        .find(|version| {
            version
                .split('.')
                .next()
                .is_some_and(|major| major.parse::<u32>().is_ok())
        })
        .ok_or_else(|| ShellError::UserAgentLookup("no usable version in response".to_string()))
}

/// Reduced Chrome user agent: only the major version is exposed.
pub fn chrome_user_agent(version: &str, platform: UserAgentPlatform) -> String {
    let major = version.split('.').next().unwrap_or(version);
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.0.0 Safari/537.36",
        platform.os_token()
    )
}

pub fn fetch_latest_chrome_version() -> Result<String, ShellError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(LOOKUP_TIMEOUT))
        .build()
        .into();

    let mut body = agent
        .get(CHROME_VERSIONS_URL)
        .header("Accept", "application/json")
        .call()
        .map_err(|error| ShellError::UserAgentLookup(error.to_string()))?
        .into_body();
    let raw = body
        .with_config()
        .limit(MAX_RESPONSE_SIZE)
        .read_to_string()
        .map_err(|error| ShellError::UserAgentLookup(error.to_string()))?;
    parse_chrome_version(&raw)
}

/// Blocking. Never fails: lookup errors fall back to a built-in version.
pub fn resolve_auto_user_agent() -> String {
    resolve_from(fetch_latest_chrome_version(), UserAgentPlatform::current())
}

fn resolve_from(lookup: Result<String, ShellError>, platform: UserAgentPlatform) -> String {
    let version = match lookup {
        Ok(version) => {
            tracing::info!(event = "shell.user_agent.lookup_succeeded", version = %version);
            version
        }
        Err(error) => {
            tracing::warn!(
                event = "shell.user_agent.lookup_failed",
                error = %error,
                fallback = FALLBACK_CHROME_VERSION
            );
            FALLBACK_CHROME_VERSION.to_string()
        }
    };
    chrome_user_agent(&version, platform)
}
