//! Configuration file handling for ~/.kymobutler/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use super::settings::*;

use crate::client::{AnalysisRequest, ClientConfig};

/// Name of the per-user configuration directory.
pub const CONFIG_DIR_NAME: &str = ".kymobutler";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.kymobutler/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.kymobutler/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
        }
        Ok(path)
    }

    /// Builds the client configuration described by this file.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_url(self.service.url.clone().unwrap_or_default())
            .with_timeout(Duration::from_secs(self.service.timeout))
            .with_poll_interval(Duration::from_millis(self.service.poll_interval_ms))
            .with_simplify_tracks(self.analysis.simplify_tracks)
            .with_debug_dir(self.debug.enabled.then(|| self.debug.directory.clone()))
    }

    /// Builds an analysis request for `image` with the configured parameters.
    pub fn analysis_request(&self, image: Vec<u8>) -> AnalysisRequest {
        AnalysisRequest::new(image)
            .with_threshold(self.analysis.threshold)
            .with_minimum_size(self.analysis.minimum_size)
            .with_minimum_frames(self.analysis.minimum_frames)
    }
}

/// Get the path to the config directory (~/.kymobutler).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Get the path to the config file (~/.kymobutler/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert!(config.service.url.is_none());
        assert_eq!(config.service.timeout, DEFAULT_SERVICE_TIMEOUT_SECS);
        assert_eq!(config.service.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.analysis.threshold, 0.2);
        assert_eq!(config.analysis.minimum_size, 3);
        assert_eq!(config.analysis.minimum_frames, 3);
        assert!(config.logging.file.ends_with(DEFAULT_LOG_FILE_NAME));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested/dir/config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();
        assert!(config_path.exists());
    }

    #[test]
    fn test_client_config_conversion() {
        let mut config = ConfigFile::default();
        config.service.url = Some("http://svc/api".to_string());
        config.service.timeout = 30;
        config.service.poll_interval_ms = 100;
        config.analysis.simplify_tracks = false;

        let client = config.client_config();
        assert_eq!(client.url(), "http://svc/api");
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert_eq!(client.poll_interval(), Duration::from_millis(100));
        assert!(!client.simplify_tracks());
        assert!(client.debug_dir().is_none());

        config.debug.enabled = true;
        assert_eq!(
            config.client_config().debug_dir(),
            Some(config.debug.directory.as_path())
        );
    }

    #[test]
    fn test_unset_url_gives_unconfigured_client() {
        assert!(!ConfigFile::default().client_config().is_configured());
    }

    #[test]
    fn test_analysis_request_uses_parameters() {
        let mut config = ConfigFile::default();
        config.analysis.threshold = 0.5;
        config.analysis.minimum_frames = 8;

        let request = config.analysis_request(vec![1, 2]);
        assert_eq!(request.threshold(), 0.5);
        assert_eq!(request.minimum_size(), 3);
        assert_eq!(request.minimum_frames(), 8);
        assert_eq!(request.image(), &[1, 2]);
    }
}
