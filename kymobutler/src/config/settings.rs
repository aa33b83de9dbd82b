//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Analysis service endpoint and timing
    pub service: ServiceSettings,
    /// Detection parameters sent with each analysis
    pub analysis: AnalysisSettings,
    /// Raw response capture
    pub debug: DebugSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    /// Endpoint URL. `None` until the user sets one.
    pub url: Option<String>,
    /// Response timeout in seconds.
    pub timeout: u64,
    /// Watchdog poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

/// Analysis parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Detection threshold (`p` form field).
    pub threshold: f32,
    /// Minimum number of pixels travelled for a track to be kept.
    pub minimum_size: u32,
    /// Minimum number of frames for a track to be kept.
    pub minimum_frames: u32,
    /// Reduce tracks to their slope breakpoints after decoding.
    pub simplify_tracks: bool,
}

/// Debug configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugSettings {
    /// Save every raw response.
    pub enabled: bool,
    /// Directory receiving the saved responses.
    pub directory: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}
