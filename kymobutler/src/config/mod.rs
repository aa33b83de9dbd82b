//! Configuration file and key access.
//!
//! User settings live in `~/.kymobutler/config.ini`:
//!
//! ```ini
//! [service]
//! url = https://example.org/kymobutler/api
//! timeout = 120
//! poll_interval_ms = 250
//!
//! [analysis]
//! threshold = 0.2
//! minimum_size = 3
//! minimum_frames = 3
//! simplify_tracks = true
//!
//! [debug]
//! enabled = false
//! directory = ~/.kymobutler/debug
//!
//! [logging]
//! file = ~/.kymobutler/kymobutler.log
//! ```
//!
//! A missing file yields defaults. [`ConfigFile::client_config`] turns the
//! loaded settings into a [`ClientConfig`](crate::client::ClientConfig).

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    DEFAULT_DEBUG_DIR_NAME, DEFAULT_LOG_FILE_NAME, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SERVICE_TIMEOUT_SECS,
};
pub use file::{config_directory, config_file_path, ConfigFileError, CONFIG_DIR_NAME};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{AnalysisSettings, ConfigFile, DebugSettings, LoggingSettings, ServiceSettings};
