//! Client for the remote analysis service.
//!
//! [`RemoteAnalysisClient`] builds the form for each query, runs one
//! [`AnalysisJob`] at a time over an injected [`Transport`], and maps the job
//! outcome to a `Result`.
//!
//! # Example
//!
//! ```no_run
//! use kymobutler::client::{AnalysisRequest, ClientConfig, RemoteAnalysisClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new().with_url("https://example.org/kymobutler");
//! let client = RemoteAnalysisClient::with_reqwest(config)?;
//!
//! let image = std::fs::read("kymograph.png")?;
//! let body = client
//!     .submit_analysis(&AnalysisRequest::new(image), &CancellationToken::new())
//!     .await?;
//! let result = client.decode(&body)?;
//! println!("{} tracks", result.tracks().len());
//! # Ok(())
//! # }
//! ```

mod config;
mod request;

pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use request::{
    analysis_form, statistics_form, upload_form, AnalysisRequest, DEFAULT_MINIMUM_FRAMES,
    DEFAULT_MINIMUM_SIZE, DEFAULT_THRESHOLD,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::export::save_debug_response;
use crate::job::{format_elapsed, AnalysisJob, JobOutcome, ProgressObserver, Query, TracingProgress};
use crate::response::{is_well_formed, DecodeError, DecodeOptions, DecodedResult, ResponseDecoder};
use crate::track::Trajectory;
use crate::transport::{MultipartForm, ReqwestTransport, Transport, TransportError};

/// Errors returned by [`RemoteAnalysisClient`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The caller cancelled the job.
    #[error("Process cancelled")]
    Cancelled,

    /// No response arrived before the deadline.
    #[error("No response from the service after {}", elapsed_text(.elapsed))]
    TimedOut { elapsed: Duration },

    /// The transport failed.
    #[error("{0}")]
    TransportFailed(#[from] TransportError),

    /// Another job is still running on this client.
    #[error("Another request is already in progress")]
    JobInProgress,

    /// No service URL is configured.
    #[error("No URL found for the API: set service.url in the configuration")]
    NotConfigured,

    /// Tracks could not be encoded for upload.
    #[error("Failed to encode tracks: {0}")]
    Encode(String),
}

impl ClientError {
    /// True for cancellations and timeouts, as opposed to failures.
    pub fn is_user_abort(&self) -> bool {
        matches!(self, ClientError::Cancelled | ClientError::TimedOut { .. })
    }

    /// The service's own JSON answer attached to an HTTP error status.
    ///
    /// Returns `None` unless the body is a well-formed response document,
    /// so the caller can hand it straight to the decoder.
    pub fn service_response(&self) -> Option<&[u8]> {
        match self {
            ClientError::TransportFailed(e) => e.body().filter(|body| is_well_formed(body)),
            _ => None,
        }
    }
}

fn elapsed_text(elapsed: &Duration) -> String {
    format_elapsed(*elapsed)
}

/// Releases the client's busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Client running one job at a time against the analysis service.
pub struct RemoteAnalysisClient<T = ReqwestTransport> {
    transport: Arc<T>,
    config: ClientConfig,
    observer: Arc<dyn ProgressObserver>,
    busy: AtomicBool,
}

impl RemoteAnalysisClient<ReqwestTransport> {
    /// Creates a client using the reqwest transport.
    pub fn with_reqwest(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(ReqwestTransport::new()?, config))
    }
}

impl<T> RemoteAnalysisClient<T>
where
    T: Transport + 'static,
{
    /// Creates a client reporting progress through `tracing`.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            observer: Arc::new(TracingProgress),
            busy: AtomicBool::new(false),
        }
    }

    /// Replaces the progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// True while a job is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Submits a kymograph for analysis and returns the raw response body.
    pub async fn submit_analysis(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ClientError> {
        self.execute(Query::Analysis, || Ok(analysis_form(request)), cancel)
            .await
    }

    /// Asks the service for its usage statistics.
    pub async fn request_statistics(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ClientError> {
        self.execute(Query::Stats, || Ok(statistics_form()), cancel)
            .await
    }

    /// Uploads a kymograph together with corrected tracks.
    pub async fn submit_correction(
        &self,
        request: &AnalysisRequest,
        tracks: &[Trajectory],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ClientError> {
        self.execute(
            Query::Upload,
            || upload_form(request, tracks).map_err(|e| ClientError::Encode(e.to_string())),
            cancel,
        )
        .await
    }

    /// Decodes a response body with this client's track simplification setting.
    pub fn decode(&self, body: &[u8]) -> Result<DecodedResult, DecodeError> {
        let options = DecodeOptions {
            simplify_tracks: self.config.simplify_tracks(),
        };
        ResponseDecoder::parse(body).map(|decoder| decoder.decode(&options))
    }

    async fn execute<F>(
        &self,
        query: Query,
        build_form: F,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ClientError>
    where
        F: FnOnce() -> Result<MultipartForm, ClientError>,
    {
        if !self.config.is_configured() {
            return Err(ClientError::NotConfigured);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(query = %query, "Rejecting request: another job is running");
            return Err(ClientError::JobInProgress);
        }
        let _busy = BusyGuard(&self.busy);

        let form = build_form()?;
        let job = AnalysisJob::new(query, form, self.config.job_settings());
        let id = job.id();

        match job
            .run(Arc::clone(&self.transport), cancel, self.observer.as_ref())
            .await
        {
            JobOutcome::Completed(body) => {
                debug!(job = %id, bytes = body.len(), "Response received");
                if let Some(dir) = self.config.debug_dir() {
                    if let Err(e) = save_debug_response(dir, &body) {
                        warn!(job = %id, error = %e, "Failed to save debug response");
                    }
                }
                Ok(body)
            }
            JobOutcome::Cancelled => {
                info!(job = %id, "Process cancelled");
                Err(ClientError::Cancelled)
            }
            JobOutcome::TimedOut { elapsed } => Err(ClientError::TimedOut { elapsed }),
            JobOutcome::TransportFailed(e) => Err(ClientError::TransportFailed(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobState, RecordingProgress};
    use crate::track::TrackPoint;
    use crate::transport::tests::MockTransport;

    const URL: &str = "http://kymobutler.test/api";

    fn client(mock: MockTransport) -> RemoteAnalysisClient<MockTransport> {
        RemoteAnalysisClient::new(mock, ClientConfig::new().with_url(URL))
    }

    #[tokio::test]
    async fn test_statistics_round_trip() {
        let body = b"{\n\t\"MaxKymographs\": 100,\n\t\"KymographsLeft\": 97\n}".to_vec();
        let mock = MockTransport::responding(body.clone());
        let client = client(mock.clone());

        let received = client
            .request_statistics(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(received, body);

        let decoded = client.decode(&received).unwrap();
        assert_eq!(decoded.max_kymographs, Some(100));
        assert_eq!(decoded.kymographs_left, Some(97));

        let (url, form) = mock.last_form().unwrap();
        assert_eq!(url, URL);
        assert_eq!(form.get_text("query"), Some("stats"));
        assert!(!client.is_busy());
    }

    #[tokio::test]
    async fn test_analysis_sends_parameters() {
        let mock = MockTransport::responding(b"{\n\t\"tracks\": []\n}".to_vec());
        let client = client(mock.clone());
        let request = AnalysisRequest::new(vec![1, 2, 3]).with_threshold(0.5);

        client
            .submit_analysis(&request, &CancellationToken::new())
            .await
            .unwrap();

        let (_, form) = mock.last_form().unwrap();
        assert_eq!(form.get_text("query"), Some("analysis"));
        assert_eq!(form.get_bytes("Kymograph"), Some(&[1u8, 2, 3][..]));
        assert_eq!(form.get_text("p"), Some("0.5"));
        assert_eq!(form.get_text("minimumSize"), Some("3"));
        assert_eq!(form.get_text("minimumFrames"), Some("3"));
    }

    #[tokio::test]
    async fn test_correction_sends_tracks() {
        let mock = MockTransport::responding(b"{\n\t\"messages\": \"thanks\"\n}".to_vec());
        let client = client(mock.clone());
        let tracks = vec![Trajectory::new(
            "Track_1",
            vec![TrackPoint::new(1.0, 2.0), TrackPoint::new(3.0, 2.0)],
        )];

        client
            .submit_correction(&AnalysisRequest::new(vec![0]), &tracks, &CancellationToken::new())
            .await
            .unwrap();

        let (_, form) = mock.last_form().unwrap();
        assert_eq!(form.get_text("query"), Some("upload"));
        assert_eq!(form.get_text("tracks"), Some("[[[1.0,2.0],[3.0,2.0]]]"));
    }

    #[tokio::test]
    async fn test_empty_url_is_not_configured() {
        let mock = MockTransport::responding(b"{}".to_vec());
        let client = RemoteAnalysisClient::new(mock.clone(), ClientConfig::new());

        let result = client.request_statistics(&CancellationToken::new()).await;
        assert_eq!(result, Err(ClientError::NotConfigured));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_second_submission_is_rejected_while_running() {
        let mock = MockTransport::silent();
        let started = Arc::clone(&mock.started);
        let client = Arc::new(client(mock));
        let cancel = CancellationToken::new();

        let first = {
            let client = Arc::clone(&client);
            let cancel = cancel.clone();
            tokio::spawn(async move { client.request_statistics(&cancel).await })
        };

        started.notified().await;
        assert!(client.is_busy());

        let second = client.request_statistics(&CancellationToken::new()).await;
        assert_eq!(second, Err(ClientError::JobInProgress));

        cancel.cancel();
        let first = first.await.unwrap();
        assert_eq!(first, Err(ClientError::Cancelled));
        assert!(!client.is_busy());
    }

    #[tokio::test]
    async fn test_dropped_submission_frees_client_without_leaking_request() {
        let mock = MockTransport::silent();
        let client = client(mock.clone());
        let cancel = CancellationToken::new();

        for round in 1..=2 {
            let result =
                tokio::time::timeout(Duration::from_millis(50), client.request_statistics(&cancel))
                    .await;
            assert!(result.is_err(), "silent transport should never answer");

            // The aborted transport task is dropped on the next scheduler pass.
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(!client.is_busy());
            // Each request ends before the next one starts.
            assert_eq!(mock.call_count(), round);
            assert_eq!(mock.drop_count(), round);
        }
    }

    #[tokio::test]
    async fn test_timeout_maps_to_error_and_frees_client() {
        let mock = MockTransport::silent();
        let progress = Arc::new(RecordingProgress::default());
        let client = RemoteAnalysisClient::new(
            mock.clone(),
            ClientConfig::new()
                .with_url(URL)
                .with_timeout(Duration::from_millis(100)),
        )
        .with_observer(progress.clone());

        let err = client
            .request_statistics(&CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::TimedOut { .. }));
        assert!(err.is_user_abort());
        assert_eq!(mock.drop_count(), 1);
        assert_eq!(progress.finished_states(), vec![JobState::TimedOut]);
        assert!(!client.is_busy());
    }

    #[tokio::test]
    async fn test_transport_error_is_not_user_abort() {
        let mock = MockTransport::failing(TransportError::Request("connection refused".into()));
        let err = client(mock)
            .request_statistics(&CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::TransportFailed(_)));
        assert!(!err.is_user_abort());
        assert_eq!(err.to_string(), "Request failed: connection refused");
    }

    #[tokio::test]
    async fn test_error_status_exposes_service_response() {
        let body = b"{\n\t\"error\": \"quota exceeded\",\n\t\"messages\": \"try tomorrow\"\n}".to_vec();
        let mock = MockTransport::failing(TransportError::Status {
            status: 429,
            url: URL.to_string(),
            body: body.clone(),
        });
        let client = client(mock);

        let err = client
            .request_statistics(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("HTTP 429 from {}", URL));

        let payload = err.service_response().unwrap();
        assert_eq!(payload, &body[..]);
        let decoded = client.decode(payload).unwrap();
        assert_eq!(decoded.error.as_deref(), Some("quota exceeded"));
        assert_eq!(decoded.messages.as_deref(), Some("try tomorrow"));
    }

    #[test]
    fn test_service_response_ignores_non_json_bodies() {
        let html = ClientError::TransportFailed(TransportError::Status {
            status: 502,
            url: URL.to_string(),
            body: b"<html>Bad Gateway</html>".to_vec(),
        });
        assert_eq!(html.service_response(), None);
        assert_eq!(ClientError::Cancelled.service_response(), None);
    }

    #[tokio::test]
    async fn test_non_finite_track_is_rejected_before_sending() {
        let mock = MockTransport::responding(b"{}".to_vec());
        let client = client(mock.clone());
        let tracks = vec![Trajectory::new(
            "Track_1",
            vec![TrackPoint::new(0.0, 1.0), TrackPoint::new(1.0, f64::NAN)],
        )];

        let err = client
            .submit_correction(&AnalysisRequest::new(vec![0]), &tracks, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Encode(_)));
        assert_eq!(mock.call_count(), 0);
        assert!(!client.is_busy());
    }

    #[test]
    fn test_timeout_message() {
        let err = ClientError::TimedOut {
            elapsed: Duration::from_secs(125),
        };
        assert_eq!(err.to_string(), "No response from the service after 02:05");
    }

    #[test]
    fn test_decode_honours_simplify_setting() {
        let body = b"{\n\t\"tracks\": [[[0, 0], [1, 1], [2, 2]]]\n}";
        let dense = RemoteAnalysisClient::new(
            MockTransport::silent(),
            ClientConfig::new().with_url(URL).with_simplify_tracks(false),
        );
        let sparse = client(MockTransport::silent());

        assert_eq!(dense.decode(body).unwrap().tracks()[0].len(), 3);
        assert_eq!(sparse.decode(body).unwrap().tracks()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_debug_dir_receives_raw_body() {
        let temp = tempfile::TempDir::new().unwrap();
        let body = b"{\n\t\"Version\": \"2.1\"\n}".to_vec();
        let client = RemoteAnalysisClient::new(
            MockTransport::responding(body.clone()),
            ClientConfig::new()
                .with_url(URL)
                .with_debug_dir(Some(temp.path().to_path_buf())),
        );

        client
            .request_statistics(&CancellationToken::new())
            .await
            .unwrap();

        let saved: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(saved.len(), 1);
        assert_eq!(std::fs::read(&saved[0]).unwrap(), body);
    }
}
