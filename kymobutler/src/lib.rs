//! KymoButler - client for the remote kymograph analysis service
//!
//! This library submits kymograph images to a KymoButler service, waits for
//! the answer under a watchdog with timeout and cancellation, and decodes the
//! returned kymograph, overlay and trajectories.
//!
//! # High-Level API
//!
//! For most use cases, [`client::RemoteAnalysisClient`] is the entry point:
//!
//! ```ignore
//! use kymobutler::client::{AnalysisRequest, RemoteAnalysisClient};
//! use kymobutler::config::ConfigFile;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ConfigFile::load()?;
//! let client = RemoteAnalysisClient::with_reqwest(config.client_config())?;
//!
//! let request = config.analysis_request(std::fs::read("kymograph.png")?);
//! let body = client.submit_analysis(&request, &CancellationToken::new()).await?;
//! let result = client.decode(&body)?;
//! ```

pub mod client;
pub mod config;
pub mod export;
pub mod job;
pub mod logging;
pub mod response;
pub mod track;
pub mod transport;

/// Version of the KymoButler library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use client::{AnalysisRequest, ClientConfig, ClientError, RemoteAnalysisClient};
pub use response::{DecodeError, DecodedResult, ResponseDecoder};
pub use track::{TrackPoint, Trajectory};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
