use std::env;
use std::path::PathBuf;

use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "LOVE_NOTES_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/love_notes/config.json";

pub const LOG_DIR_ENV: &str = "LOVE_NOTES_LOG_DIR";
pub const DEFAULT_LOG_DIR: &str = "/var/log";
pub const LOG_FILE_NAME: &str = "love_notes_display.log";

/// Get the path to the config file.
/// `LOVE_NOTES_CONFIG` wins over the well-known location.
pub fn config_path() -> PathBuf {
    if let Some(custom) = non_empty_env(CONFIG_PATH_ENV) {
        debug!(path = %custom, "Using config path from environment");
        return PathBuf::from(custom);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Get the directory the persistent log file is written to
pub fn log_dir() -> PathBuf {
    non_empty_env(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
