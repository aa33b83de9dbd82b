//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, client creation, cancellation and
//! file operations to reduce duplication across command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kymobutler::client::{ClientConfig, RemoteAnalysisClient};
use kymobutler::config::{ConfigFile, DEFAULT_LOG_FILE_NAME};
use kymobutler::logging::{init_logging_full, LoggingGuard};
use kymobutler::response::DecodedResult;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CliError;
use crate::progress::ConsoleProgress;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    debug_mode: bool,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new() -> Result<Self, CliError> {
        Self::with_debug(false)
    }

    /// Create a new CLI runner with optional debug logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of
    ///   RUST_LOG, mirrors log events to stdout and keeps raw responses
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string());

        // Results go to stdout; log lines only join them when debugging
        let stdout_enabled = debug_mode;

        let logging_guard = init_logging_full(&log_dir, &log_file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            debug_mode,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("KymoButler v{}", kymobutler::VERSION);
        info!("KymoButler CLI: {} command", command);
    }

    /// Create a client from the loaded configuration after applying `adjust`.
    ///
    /// Debug mode always keeps raw responses, in the configured debug
    /// directory.
    pub fn create_client<F>(&self, adjust: F) -> Result<RemoteAnalysisClient, CliError>
    where
        F: FnOnce(ClientConfig) -> ClientConfig,
    {
        let mut client_config = adjust(self.config.client_config());
        if self.debug_mode && client_config.debug_dir().is_none() {
            client_config = client_config.with_debug_dir(Some(self.config.debug.directory.clone()));
        }

        if let Some(dir) = client_config.debug_dir() {
            info!(dir = %dir.display(), "Raw responses will be saved");
        }

        let client = RemoteAnalysisClient::with_reqwest(client_config)?
            .with_observer(Arc::new(ConsoleProgress::new()));
        info!(url = %client.config().url(), "Client created");
        Ok(client)
    }

    /// Token cancelled when the user presses Ctrl-C.
    pub fn cancellation_on_ctrl_c(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let trigger = token.clone();

        if let Err(e) = ctrlc::set_handler(move || {
            info!("Interrupt received, cancelling");
            trigger.cancel();
        }) {
            warn!(error = %e, "Failed to set signal handler");
        }

        token
    }

    /// Read an input file.
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>, CliError> {
        std::fs::read(path).map_err(|error| CliError::FileRead {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Print the textual parts of a decoded response.
    pub fn report(&self, result: &DecodedResult) {
        if let Some(messages) = &result.messages {
            println!("Messages: {}", messages);
        }
        if let Some(left) = result.kymographs_left {
            println!("Kymographs left: {}", left);
        }
        if let Some(max) = result.max_kymographs {
            println!("Max. kymographs: {}", max);
        }
        if let Some(version) = &result.version {
            println!("API version: {}", version);
        }
        if let Some(error) = &result.error {
            eprintln!("Service error: {}", error);
        }
        for field_error in &result.field_errors {
            warn!(error = %field_error, "Response field skipped");
            eprintln!("Warning: {}", field_error);
        }
    }
}
