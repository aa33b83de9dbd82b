//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::job::{JobSettings, DEFAULT_POLL_INTERVAL};

/// Default response timeout (2 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration of a [`super::RemoteAnalysisClient`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use kymobutler::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_url("https://example.org/kymobutler")
///     .with_timeout(Duration::from_secs(30));
///
/// assert!(config.is_configured());
/// assert_eq!(config.timeout(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service endpoint; empty means not configured.
    url: String,
    /// Deadline for a response.
    timeout: Duration,
    /// Watchdog wake-up interval.
    poll_interval: Duration,
    /// Simplify decoded tracks to slope breakpoints.
    simplify_tracks: bool,
    /// Where raw responses are saved, when set.
    debug_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the response timeout. Default: 120 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the watchdog poll interval. Default: 250 milliseconds.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_simplify_tracks(mut self, simplify: bool) -> Self {
        self.simplify_tracks = simplify;
        self
    }

    /// Enable saving of raw responses into `dir`.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn simplify_tracks(&self) -> bool {
        self.simplify_tracks
    }

    pub fn debug_dir(&self) -> Option<&Path> {
        self.debug_dir.as_deref()
    }

    /// True when an endpoint URL is set.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Snapshot of the settings a job needs.
    pub fn job_settings(&self) -> JobSettings {
        JobSettings {
            url: self.url.trim().to_string(),
            timeout: self.timeout,
            poll_interval: self.poll_interval,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            simplify_tracks: true,
            debug_dir: None,
        }
    }
}
