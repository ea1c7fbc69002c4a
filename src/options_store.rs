use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{errors::ShellError, options::Options, CONFIG_ENV, CONFIG_FILE_NAME, DATA_DIR_NAME};

const MAXIMIZE_FIELD: &str = "maximize";

pub fn default_data_dir() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Config lookup order: env override, bundled resource, then the data dir.
pub fn resolve_config_path(resource_dir: Option<&Path>) -> Option<PathBuf> {
    if let Ok(raw) = env::var(CONFIG_ENV) {
        let path = PathBuf::from(raw.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    let candidates = [
        resource_dir.map(|dir| dir.join(CONFIG_FILE_NAME)),
        default_data_dir().map(|dir| dir.join(CONFIG_FILE_NAME)),
    ];
    candidates.into_iter().flatten().find(|path| path.is_file())
}

pub fn load_options(path: &Path) -> Result<Options, ShellError> {
    let raw = fs::read_to_string(path).map_err(|source| ShellError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let options: Options = serde_json::from_str(&raw).map_err(|source| ShellError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    options.parsed_target_url()?;
    Ok(options)
}

/// Rewrites the config with `maximize` cleared, keeping every other key as-is.
pub fn persist_consumed_maximize(path: &Path) -> Result<(), ShellError> {
    let write_error = |message: String| ShellError::ConfigWrite {
        path: path.to_path_buf(),
        message,
    };

    let raw = fs::read_to_string(path).map_err(|error| write_error(error.to_string()))?;
    let mut parsed: Value =
        serde_json::from_str(&raw).map_err(|error| write_error(error.to_string()))?;
    let Some(object) = parsed.as_object_mut() else {
        return Err(write_error("config root is not a JSON object".to_string()));
    };
    object.insert(MAXIMIZE_FIELD.to_string(), Value::Bool(false));

    let serialized =
        serde_json::to_string_pretty(&parsed).map_err(|error| write_error(error.to_string()))?;
    fs::write(path, serialized).map_err(|error| write_error(error.to_string()))?;

    tracing::info!(
        event = "shell.config.maximize_consumed",
        path = %path.display()
    );
    Ok(())
}
