//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::str::FromStr;
use thiserror::Error;

use super::file::ConfigFile;
use super::parser::{expand_tilde, is_http_url, parse_bool, parse_nonzero, parse_threshold};
use super::writer::path_to_string;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Service settings
    ServiceUrl,
    ServiceTimeout,
    ServicePollIntervalMs,

    // Analysis settings
    AnalysisThreshold,
    AnalysisMinimumSize,
    AnalysisMinimumFrames,
    AnalysisSimplifyTracks,

    // Debug settings
    DebugEnabled,
    DebugDirectory,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "service.url" => Ok(ConfigKey::ServiceUrl),
            "service.timeout" => Ok(ConfigKey::ServiceTimeout),
            "service.poll_interval_ms" => Ok(ConfigKey::ServicePollIntervalMs),

            "analysis.threshold" => Ok(ConfigKey::AnalysisThreshold),
            "analysis.minimum_size" => Ok(ConfigKey::AnalysisMinimumSize),
            "analysis.minimum_frames" => Ok(ConfigKey::AnalysisMinimumFrames),
            "analysis.simplify_tracks" => Ok(ConfigKey::AnalysisSimplifyTracks),

            "debug.enabled" => Ok(ConfigKey::DebugEnabled),
            "debug.directory" => Ok(ConfigKey::DebugDirectory),

            "logging.file" => Ok(ConfigKey::LoggingFile),

            _ => Err(ConfigKeyError::UnknownKey(s.to_string())),
        }
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "service.url").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ServiceUrl => "service.url",
            ConfigKey::ServiceTimeout => "service.timeout",
            ConfigKey::ServicePollIntervalMs => "service.poll_interval_ms",
            ConfigKey::AnalysisThreshold => "analysis.threshold",
            ConfigKey::AnalysisMinimumSize => "analysis.minimum_size",
            ConfigKey::AnalysisMinimumFrames => "analysis.minimum_frames",
            ConfigKey::AnalysisSimplifyTracks => "analysis.simplify_tracks",
            ConfigKey::DebugEnabled => "debug.enabled",
            ConfigKey::DebugDirectory => "debug.directory",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "service").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "url").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ServiceUrl => config.service.url.clone().unwrap_or_default(),
            ConfigKey::ServiceTimeout => config.service.timeout.to_string(),
            ConfigKey::ServicePollIntervalMs => config.service.poll_interval_ms.to_string(),
            ConfigKey::AnalysisThreshold => config.analysis.threshold.to_string(),
            ConfigKey::AnalysisMinimumSize => config.analysis.minimum_size.to_string(),
            ConfigKey::AnalysisMinimumFrames => config.analysis.minimum_frames.to_string(),
            ConfigKey::AnalysisSimplifyTracks => config.analysis.simplify_tracks.to_string(),
            ConfigKey::DebugEnabled => config.debug.enabled.to_string(),
            ConfigKey::DebugDirectory => path_to_string(&config.debug.directory),
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    /// The config is left unchanged when validation fails.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        let value = value.trim();

        match self {
            ConfigKey::ServiceUrl => {
                config.service.url = optional_string(value);
            }
            ConfigKey::ServiceTimeout => {
                config.service.timeout = self.parsed(parse_nonzero(value))?;
            }
            ConfigKey::ServicePollIntervalMs => {
                config.service.poll_interval_ms = self.parsed(parse_nonzero(value))?;
            }
            ConfigKey::AnalysisThreshold => {
                config.analysis.threshold = self.parsed(parse_threshold(value))?;
            }
            ConfigKey::AnalysisMinimumSize => {
                config.analysis.minimum_size = self.parsed(value.parse().ok())?;
            }
            ConfigKey::AnalysisMinimumFrames => {
                config.analysis.minimum_frames = self.parsed(value.parse().ok())?;
            }
            ConfigKey::AnalysisSimplifyTracks => {
                config.analysis.simplify_tracks = parse_bool(value);
            }
            ConfigKey::DebugEnabled => {
                config.debug.enabled = parse_bool(value);
            }
            ConfigKey::DebugDirectory => {
                config.debug.directory = expand_tilde(value);
            }
            ConfigKey::LoggingFile => {
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    fn parsed<T>(&self, value: Option<T>) -> Result<T, ConfigKeyError> {
        value.ok_or_else(|| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: "value could not be parsed".to_string(),
        })
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::ServiceUrl => Box::new(OptionalUrlSpec),
            ConfigKey::ServiceTimeout => Box::new(NonZeroIntegerSpec),
            ConfigKey::ServicePollIntervalMs => Box::new(NonZeroIntegerSpec),
            ConfigKey::AnalysisThreshold => Box::new(UnitIntervalSpec),
            ConfigKey::AnalysisMinimumSize => Box::new(PositiveIntegerSpec),
            ConfigKey::AnalysisMinimumFrames => Box::new(PositiveIntegerSpec),
            ConfigKey::AnalysisSimplifyTracks => Box::new(BooleanSpec),
            ConfigKey::DebugEnabled => Box::new(BooleanSpec),
            ConfigKey::DebugDirectory => Box::new(PathSpec),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ServiceUrl,
            ConfigKey::ServiceTimeout,
            ConfigKey::ServicePollIntervalMs,
            ConfigKey::AnalysisThreshold,
            ConfigKey::AnalysisMinimumSize,
            ConfigKey::AnalysisMinimumFrames,
            ConfigKey::AnalysisSimplifyTracks,
            ConfigKey::DebugEnabled,
            ConfigKey::DebugDirectory,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Check if the value satisfies this specification.
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Specification for positive integer values.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<u32>()
            .map(|_| ())
            .map_err(|_| "must be a positive integer".to_string())
    }
}

/// Specification for integers greater than zero.
struct NonZeroIntegerSpec;

impl ValueSpecification for NonZeroIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_nonzero(value)
            .map(|_| ())
            .ok_or_else(|| "must be an integer greater than zero".to_string())
    }
}

/// Specification for numbers between 0 and 1 inclusive.
struct UnitIntervalSpec;

impl ValueSpecification for UnitIntervalSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_threshold(value)
            .map(|_| ())
            .ok_or_else(|| "must be a number between 0 and 1".to_string())
    }
}

/// Specification for boolean values.
struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        let valid = ["true", "false", "yes", "no", "1", "0", "on", "off"];
        if valid.contains(&lower.as_str()) {
            Ok(())
        } else {
            Err("must be true/false, yes/no, 1/0, or on/off".to_string())
        }
    }
}

/// Specification for path values (non-empty).
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// Specification for optional URL values.
struct OptionalUrlSpec;

impl ValueSpecification for OptionalUrlSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() || is_http_url(value) {
            Ok(())
        } else {
            Err("must be a URL starting with 'http://' or 'https://'".to_string())
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert empty string to None, non-empty to Some.
fn optional_string(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
