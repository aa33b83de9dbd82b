//! One submit/await/cancel cycle against the analysis service.
//!
//! An [`AnalysisJob`] runs two activities:
//!
//! - the transport call, spawned as its own task;
//! - the [`JobWatchdog`], polling the caller's cancellation token and the
//!   deadline on the calling task.
//!
//! They share only an [`OutcomeSlot`]. Whoever writes it first decides the
//! outcome. When the watchdog wins (cancel or timeout) it aborts the transport
//! task, so the request future is dropped exactly once. Dropping the job's
//! future aborts the transport task as well, so no request outlives its job.

mod progress;
mod query;
mod state;
mod watchdog;

pub use progress::{format_elapsed, JobProgress, NoOpProgress, ProgressObserver, TracingProgress};
pub use query::Query;
pub use state::{JobId, JobOutcome, JobState, OutcomeSlot};
pub use watchdog::{JobWatchdog, WatchVerdict, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};

#[cfg(test)]
pub(crate) use progress::tests::RecordingProgress;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use crate::transport::{MultipartForm, Transport, TransportError};

/// Per-job snapshot of the client settings.
///
/// Taken when the job is created, so later configuration changes never
/// affect a job already running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    pub url: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// A single-use analysis job.
pub struct AnalysisJob {
    id: JobId,
    query: Query,
    form: MultipartForm,
    settings: JobSettings,
    state: JobState,
}

impl AnalysisJob {
    pub fn new(query: Query, form: MultipartForm, settings: JobSettings) -> Self {
        Self {
            id: JobId::next(),
            query,
            form,
            settings,
            state: JobState::Created,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn query(&self) -> Query {
        self.query
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    fn advance(&mut self, next: JobState) {
        if self.state.can_advance_to(next) {
            debug!(job = %self.id, from = %self.state, to = %next, "Job state changed");
            self.state = next;
        } else {
            warn!(job = %self.id, from = %self.state, to = %next, "Ignoring invalid job transition");
        }
    }

    /// Runs the job to its terminal state.
    ///
    /// A token already cancelled on entry ends the job as
    /// [`JobOutcome::Cancelled`] without contacting the service.
    pub async fn run<T>(
        mut self,
        transport: Arc<T>,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> JobOutcome
    where
        T: Transport + 'static,
    {
        let started = Instant::now();

        if cancel.is_cancelled() {
            return self.finish(JobOutcome::Cancelled, started, observer);
        }

        let slot = Arc::new(OutcomeSlot::new());
        let done = CancellationToken::new();
        let form = std::mem::take(&mut self.form);

        info!(
            job = %self.id,
            query = %self.query,
            url = %self.settings.url,
            bytes = form.payload_size(),
            "Submitting request"
        );
        self.advance(JobState::Submitted);

        let task = {
            let slot = Arc::clone(&slot);
            let done = done.clone();
            let url = self.settings.url.clone();
            let id = self.id;

            // Aborts the request if `run` itself is dropped mid-flight.
            AbortOnDropHandle::new(tokio::spawn(async move {
                // Cancels `done` however the task ends, panics included.
                let _done = done.drop_guard();

                let outcome = match transport.post_form(&url, form).await {
                    Ok(body) => JobOutcome::Completed(body),
                    Err(e) => JobOutcome::TransportFailed(e),
                };
                if !slot.try_set(outcome) {
                    debug!(job = %id, "Transport finished after the job was settled");
                }
            }))
        };

        self.advance(JobState::Awaiting);

        let watchdog = JobWatchdog::new(self.id, self.query, self.settings.timeout)
            .with_interval(self.settings.poll_interval);
        let verdict = watchdog.watch(started, cancel, &done, observer).await;

        let forced = match verdict {
            WatchVerdict::Finished => None,
            WatchVerdict::Cancelled => Some(JobOutcome::Cancelled),
            WatchVerdict::TimedOut(elapsed) => Some(JobOutcome::TimedOut { elapsed }),
        };
        if let Some(outcome) = forced {
            if slot.try_set(outcome) {
                debug!(job = %self.id, "Aborting transport task");
                task.abort();
            }
        }

        // Wait until the request future has actually been dropped.
        if let Err(e) = task.await {
            if e.is_panic() {
                warn!(job = %self.id, "Transport task panicked");
            }
        }

        let outcome = slot.take().unwrap_or_else(|| {
            JobOutcome::TransportFailed(TransportError::Request(
                "transport task ended without a result".to_string(),
            ))
        });

        self.finish(outcome, started, observer)
    }

    fn finish(
        &mut self,
        outcome: JobOutcome,
        started: Instant,
        observer: &dyn ProgressObserver,
    ) -> JobOutcome {
        self.advance(outcome.state());

        if let JobOutcome::TransportFailed(e) = &outcome {
            warn!(job = %self.id, query = %self.query, error = %e, "Transport failed");
        }

        observer.on_finish(
            &JobProgress {
                job: self.id,
                query: self.query,
                elapsed: started.elapsed(),
            },
            self.state,
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::MockTransport;

    fn settings(timeout_ms: u64) -> JobSettings {
        JobSettings {
            url: "http://kymobutler.test/api".to_string(),
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    fn stats_job(timeout_ms: u64) -> AnalysisJob {
        AnalysisJob::new(
            Query::Stats,
            MultipartForm::new().text("query", "stats"),
            settings(timeout_ms),
        )
    }

    #[test]
    fn test_new_job_is_created() {
        let job = stats_job(1_000);
        assert_eq!(job.state(), JobState::Created);
        assert_eq!(job.query(), Query::Stats);
        assert_eq!(job.settings().timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_completes_with_body() {
        let mock = Arc::new(
            MockTransport::responding(b"{\n\t\"Version\": \"1\"}".to_vec())
                .with_delay(Duration::from_millis(20)),
        );
        let progress = RecordingProgress::default();

        let outcome = stats_job(5_000)
            .run(Arc::clone(&mock), &CancellationToken::new(), &progress)
            .await;

        assert_eq!(
            outcome,
            JobOutcome::Completed(b"{\n\t\"Version\": \"1\"}".to_vec())
        );
        assert_eq!(progress.finished_states(), vec![JobState::Completed]);
        assert_eq!(mock.call_count(), 1);

        let (url, form) = mock.last_form().unwrap();
        assert_eq!(url, "http://kymobutler.test/api");
        assert_eq!(form.get_text("query"), Some("stats"));
    }

    #[tokio::test]
    async fn test_timeout_aborts_silent_transport_once() {
        let mock = Arc::new(MockTransport::silent());
        let progress = RecordingProgress::default();
        let started = std::time::Instant::now();

        let outcome = stats_job(100)
            .run(Arc::clone(&mock), &CancellationToken::new(), &progress)
            .await;
        let wall = started.elapsed();

        match outcome {
            JobOutcome::TimedOut { elapsed } => assert!(elapsed >= Duration::from_millis(100)),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(wall < Duration::from_millis(400), "took {:?}", wall);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.drop_count(), 1);
        assert_eq!(progress.finished_states(), vec![JobState::TimedOut]);
    }

    #[tokio::test]
    async fn test_cancel_while_awaiting() {
        let mock = Arc::new(MockTransport::silent());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        let started = Arc::clone(&mock.started);
        tokio::spawn(async move {
            started.notified().await;
            trigger.cancel();
        });

        let outcome = stats_job(10_000)
            .run(Arc::clone(&mock), &cancel, &NoOpProgress)
            .await;

        assert_eq!(outcome, JobOutcome::Cancelled);
        assert_eq!(mock.drop_count(), 1);
    }

    #[tokio::test]
    async fn test_dropping_run_aborts_transport() {
        let mock = Arc::new(MockTransport::silent());
        let cancel = CancellationToken::new();

        let run = stats_job(10_000).run(Arc::clone(&mock), &cancel, &NoOpProgress);
        let result = tokio::time::timeout(Duration::from_millis(50), run).await;
        assert!(result.is_err(), "silent transport should never complete");

        // The abort is delivered on the next scheduler pass.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.drop_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_submit_never_calls_transport() {
        let mock = Arc::new(MockTransport::responding(b"{}".to_vec()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let progress = RecordingProgress::default();

        let outcome = stats_job(1_000)
            .run(Arc::clone(&mock), &cancel, &progress)
            .await;

        assert_eq!(outcome, JobOutcome::Cancelled);
        assert_eq!(mock.call_count(), 0);
        assert_eq!(progress.finished_states(), vec![JobState::Cancelled]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let error = TransportError::Status {
            status: 502,
            url: "http://kymobutler.test/api".to_string(),
            body: Vec::new(),
        };
        let mock = Arc::new(MockTransport::failing(error.clone()));

        let outcome = stats_job(1_000)
            .run(mock, &CancellationToken::new(), &NoOpProgress)
            .await;

        assert_eq!(outcome, JobOutcome::TransportFailed(error));
        assert_eq!(outcome.state(), JobState::TransportFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_while_waiting() {
        let mock = Arc::new(MockTransport::responding(b"{}".to_vec()).with_delay(Duration::from_millis(600)));
        let progress = RecordingProgress::default();

        let outcome = stats_job(10_000)
            .run(mock, &CancellationToken::new(), &progress)
            .await;

        assert!(matches!(outcome, JobOutcome::Completed(_)));
        assert_eq!(progress.tick_count(), 3);
        assert_eq!(progress.finished_states(), vec![JobState::Completed]);
    }
}
