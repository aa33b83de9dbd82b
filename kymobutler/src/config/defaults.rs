//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use super::file::config_directory;
use super::settings::*;
use crate::client::{DEFAULT_MINIMUM_FRAMES, DEFAULT_MINIMUM_SIZE, DEFAULT_THRESHOLD};

/// Default service response timeout in seconds (2 minutes).
pub const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 120;

/// Default watchdog poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "kymobutler.log";

/// Default directory name for saved raw responses.
pub const DEFAULT_DEBUG_DIR_NAME: &str = "debug";

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = config_directory();

        Self {
            service: ServiceSettings {
                url: None,
                timeout: DEFAULT_SERVICE_TIMEOUT_SECS,
                poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            },
            analysis: AnalysisSettings {
                threshold: DEFAULT_THRESHOLD,
                minimum_size: DEFAULT_MINIMUM_SIZE,
                minimum_frames: DEFAULT_MINIMUM_FRAMES,
                simplify_tracks: true,
            },
            debug: DebugSettings {
                enabled: false,
                directory: config_dir.join(DEFAULT_DEBUG_DIR_NAME),
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
