//! Miner and key configuration
//!
//! Stored as JSON. Missing fields take their defaults; unknown fields are
//! rejected so typos do not go unnoticed.

use std::fs;
use std::path::{Path, PathBuf};

use powsig_core::{DEFAULT_DIFFICULTY, DEFAULT_PROGRESS_INTERVAL, MAX_DIFFICULTY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration file name inside the key directory
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Leading zero hex characters required of a digest
    pub difficulty: u32,
    /// Give up after this many hashes (unbounded when absent)
    pub max_attempts: Option<u64>,
    /// Hashes between progress reports
    pub progress_interval: u64,
    /// Directory holding `private.pem` and `public.pem`
    pub key_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_attempts: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            key_dir: None,
        }
    }
}

impl Config {
    /// Load and validate a config file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply command-line values on top of the file; `None` keeps the file value
    pub fn with_overrides(mut self, max_attempts: Option<u64>, key_dir: Option<PathBuf>) -> Self {
        if max_attempts.is_some() {
            self.max_attempts = max_attempts;
        }
        if key_dir.is_some() {
            self.key_dir = key_dir;
        }
        self
    }

    /// Configured key directory, or `default` when neither flag nor file set one
    pub fn key_dir_or_else<F>(&self, default: F) -> PathBuf
    where
        F: FnOnce() -> PathBuf,
    {
        self.key_dir.clone().unwrap_or_else(default)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::Invalid(format!(
                "difficulty {} exceeds maximum of {}",
                self.difficulty, MAX_DIFFICULTY
            )));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.difficulty, 4);
        assert_eq!(config.max_attempts, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "difficulty": 5, "max_attempts": 1000 }"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.difficulty, 5);
        assert_eq!(config.max_attempts, Some(1000));
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
        assert_eq!(config.key_dir, None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = Config {
            difficulty: 6,
            max_attempts: Some(42),
            progress_interval: 10,
            key_dir: Some(dir.path().to_path_buf()),
        };

        config.save_to_file(&path).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{ "max_attempts": 1000, "key_dir": "/from/file" }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path)
            .unwrap()
            .with_overrides(Some(5), Some(PathBuf::from("/from/flag")));

        assert_eq!(config.max_attempts, Some(5));
        assert_eq!(
            config.key_dir_or_else(|| PathBuf::from("/default")),
            PathBuf::from("/from/flag")
        );
    }

    #[test]
    fn test_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{ "max_attempts": 1000, "key_dir": "/from/file" }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path)
            .unwrap()
            .with_overrides(None, None);

        assert_eq!(config.max_attempts, Some(1000));
        assert_eq!(
            config.key_dir_or_else(|| PathBuf::from("/default")),
            PathBuf::from("/from/file")
        );
    }

    #[test]
    fn test_default_only() {
        let config = Config::default().with_overrides(None, None);

        assert_eq!(config.max_attempts, None);
        assert_eq!(
            config.key_dir_or_else(|| PathBuf::from("/default")),
            PathBuf::from("/default")
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        fs::write(&path, r#"{ "difficulty": 65 }"#).unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, r#"{ "progress_interval": 0 }"#).unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, r#"{ "dificulty": 3 }"#).unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
