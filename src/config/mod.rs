use crate::models::SpoofConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Errors from reading the preference store.
///
/// A missing or unreadable store means "module inactive". That is a distinct
/// diagnostic state from "module active but configured to spoof nothing", so
/// loading never substitutes defaults silently.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file not found at {path}")]
    Missing { path: Utf8PathBuf },

    #[error("failed to read settings file {path}")]
    Unreadable {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}")]
    Malformed {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Read-only view of the shared preference store.
///
/// The engine receives this by injection instead of reaching for a global
/// preference handle; the settings UI owns the writing side.
pub trait ConfigurationStore: Send + Sync {
    /// Load the current configuration.
    fn load(&self) -> Result<SpoofConfig, ConfigError>;
}

/// File-backed configuration manager.
///
/// Owns the on-disk layout of the preference store: a single YAML file in a
/// world-readable directory, written by the settings UI and the import/export
/// flow, read by the engine inside the hooked process.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

/// File name of the settings YAML inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "Pixelspoof Settings.yaml";

impl ConfigManager {
    /// Create a new ConfigManager for the given configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the settings file
    ///
    /// # Returns
    /// A new ConfigManager instance
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE_NAME),
            config_dir,
        })
    }

    /// Load the settings file.
    ///
    /// # Returns
    /// The parsed [`SpoofConfig`], or a [`ConfigError`] describing why the
    /// store could not be read. Missing files are an error by design.
    pub fn load_settings(&self) -> Result<SpoofConfig, ConfigError> {
        if !self.settings_path.exists() {
            tracing::warn!("Settings file not found at {}", self.settings_path);
            return Err(ConfigError::Missing {
                path: self.settings_path.clone(),
            });
        }

        let file_contents =
            fs::read_to_string(&self.settings_path).map_err(|source| ConfigError::Unreadable {
                path: self.settings_path.clone(),
                source,
            })?;

        let config: SpoofConfig =
            serde_yaml_ng::from_str(&file_contents).map_err(|source| ConfigError::Malformed {
                path: self.settings_path.clone(),
                source,
            })?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(config)
    }

    /// Save the settings file.
    ///
    /// Used by the settings/export collaborator; the engine itself never
    /// writes. Save followed by [`load_settings`](Self::load_settings)
    /// reproduces an equal configuration.
    pub fn save_settings(&self, config: &SpoofConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings file: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the settings file path.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

impl ConfigurationStore for ConfigManager {
    fn load(&self) -> Result<SpoofConfig, ConfigError> {
        self.load_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_create_config_manager() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(manager.settings_path().as_str().ends_with(SETTINGS_FILE_NAME));
    }

    #[test]
    fn test_missing_settings_is_an_error() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(matches!(
            manager.load_settings(),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = SpoofConfig::default();
        config.spoof_settings.device_to_spoof = "Pixel 6 Pro".to_string();
        config.spoof_settings.verbose_logs = true;
        manager.save_settings(&config).unwrap();

        let loaded = manager.load_settings().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_settings_is_an_error() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.settings_path(), "Spoof_Settings: [not, a, mapping]").unwrap();

        assert!(matches!(
            manager.load_settings(),
            Err(ConfigError::Malformed { .. })
        ));
    }
}
