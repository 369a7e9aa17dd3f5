//! Configuration handling for querylab
//!
//! Reads `querylab.toml` from the config directory.
//!
//! ## Environment Variables
//!
//! The following environment variables override config file settings:
//!
//! - `QUERYLAB_ROWSTORE_URL` - Base URL of the hosted row-store
//! - `QUERYLAB_ROWSTORE_KEY` - Public API key for the row-store
//! - `QUERYLAB_STORAGE_PATH` - File backing saved queries and progress
//! - `QUERYLAB_HISTORY_CAPACITY` - Number of executions kept in history
//!
//! These can be set in a `.env` file in the config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LabError, LabResult};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "querylab.toml";

/// Environment variable names
pub const ENV_ROWSTORE_URL: &str = "QUERYLAB_ROWSTORE_URL";
pub const ENV_ROWSTORE_KEY: &str = "QUERYLAB_ROWSTORE_KEY";
pub const ENV_STORAGE_PATH: &str = "QUERYLAB_STORAGE_PATH";
pub const ENV_HISTORY_CAPACITY: &str = "QUERYLAB_HISTORY_CAPACITY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rowstore: RowStoreConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub playground: PlaygroundConfig,
}

/// Hosted row-store connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowStoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Local key-value storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the storage file (relative to the config directory)
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".querylab/storage.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaygroundConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_history_capacity() -> usize {
    querylab_core::DEFAULT_HISTORY_CAPACITY
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
        }
    }
}

/// Row-store settings with both required values present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowStoreSettings {
    pub url: String,
    pub api_key: String,
}

impl Config {
    /// Load configuration from a directory
    ///
    /// Loads any `.env` file in the directory first, then the config file if
    /// present (defaults otherwise), then applies environment overrides.
    pub fn load(dir: &Path) -> LabResult<Self> {
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let config_path = dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_ROWSTORE_URL) {
            if !url.is_empty() {
                self.rowstore.url = Some(url);
            }
        }

        if let Ok(key) = std::env::var(ENV_ROWSTORE_KEY) {
            if !key.is_empty() {
                self.rowstore.api_key = Some(key);
            }
        }

        if let Ok(path) = std::env::var(ENV_STORAGE_PATH) {
            if !path.is_empty() {
                self.storage.path = PathBuf::from(path);
            }
        }

        if let Ok(capacity) = std::env::var(ENV_HISTORY_CAPACITY) {
            if let Ok(capacity) = capacity.parse::<usize>() {
                self.playground.history_capacity = capacity;
            }
        }
    }

    /// Row-store settings, or a config error naming what is missing
    pub fn require_rowstore(&self) -> LabResult<RowStoreSettings> {
        let url = self
            .rowstore
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                LabError::Config(format!(
                    "rowstore.url is not set (config file or {})",
                    ENV_ROWSTORE_URL
                ))
            })?;
        let api_key = self
            .rowstore
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                LabError::Config(format!(
                    "rowstore.api_key is not set (config file or {})",
                    ENV_ROWSTORE_KEY
                ))
            })?;
        Ok(RowStoreSettings {
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> LabResult<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the absolute storage file path
    pub fn storage_path(&self, config_dir: &Path) -> PathBuf {
        if self.storage.path.is_absolute() {
            self.storage.path.clone()
        } else {
            config_dir.join(&self.storage.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.playground.history_capacity, 10);
        assert_eq!(config.storage.path, PathBuf::from(".querylab/storage.json"));
        assert!(config.rowstore.url.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.rowstore.url = Some("https://example.test".to_string());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("url = \"https://example.test\""));
        assert!(toml_str.contains("history_capacity = 10"));
        assert!(!toml_str.contains("api_key"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[playground]\nhistory_capacity = 3\n").unwrap();
        assert_eq!(config.playground.history_capacity, 3);
        assert_eq!(config.storage.path, default_storage_path());
    }

    #[test]
    fn test_require_rowstore() {
        let mut config = Config::default();
        let err = config.require_rowstore().unwrap_err();
        assert!(err.to_string().contains("rowstore.url"));

        config.rowstore.url = Some("https://example.test".into());
        config.rowstore.api_key = Some("  ".into());
        let err = config.require_rowstore().unwrap_err();
        assert!(err.to_string().contains("rowstore.api_key"));

        config.rowstore.api_key = Some("anon".into());
        assert_eq!(
            config.require_rowstore().unwrap(),
            RowStoreSettings {
                url: "https://example.test".into(),
                api_key: "anon".into()
            }
        );
    }

    #[test]
    fn test_storage_path_is_relative_to_config_dir() {
        let config = Config::default();
        assert_eq!(
            config.storage_path(Path::new("/srv/lab")),
            PathBuf::from("/srv/lab/.querylab/storage.json")
        );
    }
}
