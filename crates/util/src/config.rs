//! Input configuration for chatform.
//!
//! Timings and placeholder copy used by the input component are read from a
//! small JSON file in the standard configuration directory
//! (`~/.config/chatform/config.json` on most platforms). Every field is
//! optional; a missing file yields the defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the configuration path.
pub const CONFIG_PATH_ENV: &str = "CHATFORM_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Delay before input is accepted after a new question arrives.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// How long a rejection message stays visible before the field recovers.
pub const DEFAULT_ERROR_DURATION_MS: u64 = 2000;

/// Error surfaced when reading the configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions).
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings consumed by the input component and its control elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Placeholder shown in the empty text field.
    pub placeholder: String,
    /// Message shown when an answer is rejected and neither the rejection nor
    /// the question supplies one.
    pub error_placeholder: String,
    /// Message shown when a selected file exceeds the allowed size.
    pub file_too_large: String,
    /// Message shown when a selected file cannot be read.
    pub file_missing: String,
    /// Milliseconds input stays disabled after a new question arrives.
    pub settle_delay_ms: u64,
    /// Milliseconds a rejection message stays visible.
    pub error_duration_ms: u64,
    /// Number of control elements visible at once.
    pub page_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            placeholder: "Type your answer here ...".to_string(),
            error_placeholder: "Your input is not correct ...".to_string(),
            file_too_large: "File is too big".to_string(),
            file_missing: "File could not be read".to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            error_duration_ms: DEFAULT_ERROR_DURATION_MS,
            page_size: 6,
        }
    }
}

impl InputConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn error_duration(&self) -> Duration {
        Duration::from_millis(self.error_duration_ms)
    }

    /// Loads the configuration from `path`, or from the default location when
    /// `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        load_config(&resolved)
    }
}

/// Directory holding chatform's configuration and log files.
pub fn config_home() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("chatform")
}

fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }
    config_home().join(CONFIG_FILE_NAME)
}

fn load_config(path: &Path) -> Result<InputConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(InputConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(InputConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = InputConfig::load(Some(&dir.path().join("absent.json"))).expect("load config");
        assert_eq!(config, InputConfig::default());
        assert_eq!(config.settle_delay(), Duration::from_millis(1000));
        assert_eq!(config.error_duration(), Duration::from_millis(2000));
    }

    #[test]
    fn partial_file_overrides_selected_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"placeholder": "Say something", "error_duration_ms": 500}"#).expect("write config");

        let config = InputConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.placeholder, "Say something");
        assert_eq!(config.error_duration_ms, 500);
        assert_eq!(config.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").expect("write config");

        let config = InputConfig::load(Some(&path)).expect("load config");
        assert_eq!(config, InputConfig::default());
    }

    #[test]
    fn env_override_selects_config_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"page_size": 3}"#).expect("write config");

        let config = temp_env::with_var(CONFIG_PATH_ENV, Some(path.as_os_str()), || InputConfig::load(None)).expect("load config");
        assert_eq!(config.page_size, 3);
    }
}
