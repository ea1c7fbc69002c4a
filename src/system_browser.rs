use std::process::{Command, Stdio};

use url::Url;

/// Accepts the schemes the system handler can safely take over.
pub fn parse_openable_url(raw_url: &str) -> Result<Url, String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err("Missing external URL.".to_string());
    }

    let parsed = Url::parse(trimmed).map_err(|error| format!("Invalid URL: {error}"))?;
    match parsed.scheme() {
        "http" | "https" | "mailto" | "tel" => Ok(parsed),
        scheme => Err(format!("Unsupported URL scheme '{scheme}'.")),
    }
}

fn spawn_detached(mut command: Command, program: &str) -> Result<(), String> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|error| format!("Failed to run '{program}': {error}"))
}

#[cfg(target_os = "macos")]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    let mut command = Command::new("open");
    command.arg(url);
    spawn_detached(command, "open")
}

#[cfg(target_os = "windows")]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    let mut command = Command::new("rundll32");
    command.args(["url.dll,FileProtocolHandler", url]);
    spawn_detached(command, "rundll32")
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    spawn_detached(command, "xdg-open")
}

#[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
fn open_url_with_system_browser(_url: &str) -> Result<(), String> {
    Err("Opening external URLs is not supported on this platform.".to_string())
}

/// Hands `raw_url` to the OS default handler. Failures are logged, never raised.
pub fn open_external(raw_url: &str) {
    let result = parse_openable_url(raw_url)
        .and_then(|url| open_url_with_system_browser(url.as_str()));
    match result {
        Ok(()) => tracing::info!(event = "shell.external.opened", url = raw_url),
        Err(error) => tracing::warn!(event = "shell.external.failed", url = raw_url, error = %error),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_openable_url;

    #[test]
    fn parse_openable_url_accepts_web_and_mail_links() {
        assert!(parse_openable_url(" https://outside.com/a ").is_ok());
        assert!(parse_openable_url("mailto:someone@example.com").is_ok());
    }

    #[test]
    fn parse_openable_url_rejects_empty_and_local_schemes() {
        assert_eq!(
            parse_openable_url("   "),
            Err("Missing external URL.".to_string())
        );
        assert!(parse_openable_url("file:///etc/passwd").is_err());
        assert!(parse_openable_url("javascript:alert(1)").is_err());
    }
}
