//! Common types and utilities shared across CLI commands.

use std::time::Duration;

use clap::Args;
use kymobutler::client::{AnalysisRequest, ClientConfig};
use kymobutler::config::{ConfigFile, ConfigKey};

use crate::error::CliError;

/// Service overrides accepted by every command that talks to the service.
#[derive(Debug, Clone, Default, Args)]
pub struct ServiceArgs {
    /// Service URL (overrides service.url)
    #[arg(long)]
    pub url: Option<String>,

    /// Seconds to wait for a response (overrides service.timeout)
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ServiceArgs {
    /// Apply the overrides to a client configuration.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.url {
            config = config.with_url(url.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Check the overrides with the same rules as the configuration keys.
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(url) = &self.url {
            validate(ConfigKey::ServiceUrl, url)?;
        }
        if let Some(secs) = self.timeout {
            validate(ConfigKey::ServiceTimeout, &secs.to_string())?;
        }
        Ok(())
    }
}

/// Detection parameter overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct DetectionArgs {
    /// Detection threshold between 0 and 1 (overrides analysis.threshold)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Minimum object size in pixels (overrides analysis.minimum_size)
    #[arg(long)]
    pub minimum_size: Option<u32>,

    /// Minimum track length in frames (overrides analysis.minimum_frames)
    #[arg(long)]
    pub minimum_frames: Option<u32>,
}

/// Resolve analysis parameters from CLI args and config.
///
/// CLI values take precedence over the configuration file.
pub fn resolve_request(
    image: Vec<u8>,
    file_name: Option<String>,
    args: &DetectionArgs,
    config: &ConfigFile,
) -> Result<AnalysisRequest, CliError> {
    let mut request = config.analysis_request(image);

    if let Some(name) = file_name {
        request = request.with_file_name(name);
    }
    if let Some(threshold) = args.threshold {
        validate(ConfigKey::AnalysisThreshold, &threshold.to_string())?;
        request = request.with_threshold(threshold);
    }
    if let Some(size) = args.minimum_size {
        request = request.with_minimum_size(size);
    }
    if let Some(frames) = args.minimum_frames {
        request = request.with_minimum_frames(frames);
    }

    Ok(request)
}

fn validate(key: ConfigKey, value: &str) -> Result<(), CliError> {
    key.validate(value)
        .map_err(|e| CliError::Config(e.to_string()))
}
