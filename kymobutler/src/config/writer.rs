//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let url = config.service.url.as_deref().unwrap_or("");

    format!(
        r#"[service]
; KymoButler analysis endpoint (required)
; Example: url = https://example.org/kymobutler/api
url = {}
; Seconds to wait for a response before giving up (default: 120)
timeout = {}
; Progress refresh interval in milliseconds (default: 250)
poll_interval_ms = {}

[analysis]
; Detection threshold between 0 and 1 (default: 0.2)
threshold = {}
; Minimum number of pixels travelled for a track to be kept (default: 3)
minimum_size = {}
; Minimum number of frames for a track to be kept (default: 3)
minimum_frames = {}
; Reduce tracks to the points where their slope changes (default: true)
simplify_tracks = {}

[debug]
; Save every raw service response as JSON (default: false)
enabled = {}
; Directory receiving the saved responses
directory = {}

[logging]
; Log file location
file = {}
"#,
        url,
        config.service.timeout,
        config.service.poll_interval_ms,
        config.analysis.threshold,
        config.analysis.minimum_size,
        config.analysis.minimum_frames,
        config.analysis.simplify_tracks,
        config.debug.enabled,
        path_to_string(&config.debug.directory),
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
