//! File-based configuration (YAML)
//!
//! User-level settings live at `<config dir>/keystash/config.yaml`
//! (`~/.config` on Linux, `~/Library/Application Support` on macOS).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ConfigResult;
use super::store::StoreConfig;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Backend selection
    #[serde(default)]
    pub store: StoreConfig,
}

/// YAML configuration file on disk
///
/// # Example
///
/// ```no_run
/// use keystash_core::config::FileConfig;
///
/// let config = FileConfig::user().load().unwrap();
/// println!("backend: {}", config.store.backend);
/// ```
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The user-level config file
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("keystash").join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file, falling back to defaults when it does not exist
    pub fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        // An empty file deserializes as YAML null
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write the file, creating parent directories as needed
    pub fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        Ok(())
    }
}

/// Store settings from the user config file with environment overrides applied
pub fn load_store_config() -> ConfigResult<StoreConfig> {
    Ok(FileConfig::user().load()?.store.apply_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let file = FileConfig::new(dir.path().join("config.yaml"));

        assert!(!file.exists());
        assert_eq!(file.load().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file = FileConfig::new(dir.path().join("nested").join("config.yaml"));

        let config = ConfigFile {
            store: StoreConfig {
                backend: "memory".to_string(),
                account: Some("team".to_string()),
            },
        };
        file.save(&config).unwrap();

        assert!(file.exists());
        assert_eq!(file.load().unwrap(), config);

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("backend: memory"));
        assert!(content.contains("account: team"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(FileConfig::new(&path).load().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "store: [unclosed").unwrap();

        let err = FileConfig::new(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
