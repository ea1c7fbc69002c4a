use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{DESKTOP_LOG_FILE, LOG_FILTER_ENV};

const DEFAULT_DIRECTIVE: &str = "pagewrap_desktop=info";

pub fn resolve_desktop_log_path(data_dir: Option<PathBuf>, log_file_name: &str) -> PathBuf {
    match data_dir {
        Some(dir) => dir.join("logs").join(log_file_name),
        None => std::env::temp_dir().join("pagewrap").join(log_file_name),
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if let Err(error) = fs::create_dir_all(parent) {
            eprintln!("failed to create log directory {}: {error}", parent.display());
            return None;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| eprintln!("failed to open log file {}: {error}", path.display()))
        .ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the stderr subscriber plus, when it can be opened, the desktop log file.
/// Returns the file path in use.
pub fn init_logging() -> Option<PathBuf> {
    let path = resolve_desktop_log_path(crate::options_store::default_data_dir(), DESKTOP_LOG_FILE);
    let file_layer = open_log_file(&path).map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });
    let opened = file_layer.is_some();

    let result = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
    if let Err(error) = result {
        eprintln!("logging already initialized: {error}");
    }
    opened.then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_lives_under_data_dir_logs() {
        let path = resolve_desktop_log_path(Some(PathBuf::from("/data/.pagewrap")), "desktop.log");
        assert_eq!(path, PathBuf::from("/data/.pagewrap/logs/desktop.log"));
    }

    #[test]
    fn log_path_falls_back_to_temp_dir() {
        let path = resolve_desktop_log_path(None, "desktop.log");
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("pagewrap/desktop.log"));
    }

    #[test]
    fn open_log_file_creates_missing_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("desktop.log");
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }
}
