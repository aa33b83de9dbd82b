//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [service] section
    if let Some(section) = ini.section(Some("service")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.is_empty() {
                if !is_http_url(v) {
                    return Err(invalid(
                        "service",
                        "url",
                        v,
                        "must be a URL starting with 'http://' or 'https://'",
                    ));
                }
                config.service.url = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("timeout") {
            config.service.timeout = parse_nonzero(v)
                .ok_or_else(|| invalid("service", "timeout", v, "must be a positive integer (seconds)"))?;
        }
        if let Some(v) = section.get("poll_interval_ms") {
            config.service.poll_interval_ms = parse_nonzero(v).ok_or_else(|| {
                invalid(
                    "service",
                    "poll_interval_ms",
                    v,
                    "must be a positive integer (milliseconds)",
                )
            })?;
        }
    }

    // [analysis] section
    if let Some(section) = ini.section(Some("analysis")) {
        if let Some(v) = section.get("threshold") {
            config.analysis.threshold = parse_threshold(v)
                .ok_or_else(|| invalid("analysis", "threshold", v, "must be a number between 0 and 1"))?;
        }
        if let Some(v) = section.get("minimum_size") {
            config.analysis.minimum_size = v
                .trim()
                .parse()
                .map_err(|_| invalid("analysis", "minimum_size", v, "must be a positive integer"))?;
        }
        if let Some(v) = section.get("minimum_frames") {
            config.analysis.minimum_frames = v.trim().parse().map_err(|_| {
                invalid("analysis", "minimum_frames", v, "must be a positive integer")
            })?;
        }
        if let Some(v) = section.get("simplify_tracks") {
            config.analysis.simplify_tracks = parse_bool(v);
        }
    }

    // [debug] section
    if let Some(section) = ini.section(Some("debug")) {
        if let Some(v) = section.get("enabled") {
            config.debug.enabled = parse_bool(v);
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.debug.directory = expand_tilde(v);
            }
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a strictly positive integer.
pub(super) fn parse_nonzero(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// Parse a detection threshold in `0.0..=1.0`.
pub(super) fn parse_threshold(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|p| (0.0..=1.0).contains(p))
}

/// True for `http://` and `https://` URLs.
pub(super) fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[service]
url = https://kymobutler.example.org/api
timeout = 45

[analysis]
threshold = 0.35
"#,
        )
        .unwrap();

        // Specified values
        assert_eq!(
            config.service.url.as_deref(),
            Some("https://kymobutler.example.org/api")
        );
        assert_eq!(config.service.timeout, 45);
        assert_eq!(config.analysis.threshold, 0.35);

        // Default values
        assert_eq!(config.service.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.analysis.minimum_size, 3);
        assert!(config.analysis.simplify_tracks);
        assert!(!config.debug.enabled);
    }

    #[test]
    fn test_invalid_url() {
        let err = load("[service]\nurl = ftp://example.org\n").unwrap_err();
        assert!(err.to_string().contains("service.url"));
    }

    #[test]
    fn test_empty_url_stays_unset() {
        let config = load("[service]\nurl =\n").unwrap();
        assert!(config.service.url.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load("[service]\ntimeout = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = load("[analysis]\nthreshold = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"));
    }

    #[test]
    fn test_negative_minimum_frames_rejected() {
        assert!(load("[analysis]\nminimum_frames = -2\n").is_err());
    }

    #[test]
    fn test_debug_section() {
        let config = load("[debug]\nenabled = yes\ndirectory = /tmp/kb-debug\n").unwrap();
        assert!(config.debug.enabled);
        assert_eq!(config.debug.directory, PathBuf::from("/tmp/kb-debug"));
    }

    #[test]
    fn test_simplify_can_be_disabled() {
        let config = load("[analysis]\nsimplify_tracks = off\n").unwrap();
        assert!(!config.analysis.simplify_tracks);
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        // Non-tilde paths should be unchanged
        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_parse_bool_values() {
        for v in ["true", "TRUE", "1", "yes", "on", " on "] {
            assert!(parse_bool(v), "{} should be true", v);
        }
        for v in ["false", "0", "no", "off", "maybe"] {
            assert!(!parse_bool(v), "{} should be false", v);
        }
    }
}
