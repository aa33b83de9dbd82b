//! Progress reporting while a job awaits its response.
//!
//! The watchdog calls a [`ProgressObserver`] once per tick and once when the
//! job reaches its terminal state. Observers are plain callbacks; they decide
//! how (and whether) to display anything.

use std::time::Duration;

use tracing::{debug, info};

use super::{JobId, JobState, Query};

/// Snapshot passed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgress {
    pub job: JobId,
    pub query: Query,
    pub elapsed: Duration,
}

impl JobProgress {
    /// Elapsed time as `mm:ss`.
    pub fn elapsed_text(&self) -> String {
        format_elapsed(self.elapsed)
    }
}

/// Formats a duration as `mm:ss`.
///
/// Minutes are not wrapped at 60, so very long waits stay readable.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Receives progress callbacks from a running job.
pub trait ProgressObserver: Send + Sync {
    /// Called on every watchdog tick while the job awaits its response.
    fn on_tick(&self, progress: &JobProgress);

    /// Called once when the job reaches `state`.
    fn on_finish(&self, progress: &JobProgress, state: JobState);
}

/// Observer that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressObserver for NoOpProgress {
    fn on_tick(&self, _progress: &JobProgress) {}

    fn on_finish(&self, _progress: &JobProgress, _state: JobState) {}
}

/// Observer that reports through `tracing`.
///
/// Ticks are logged at debug level, the terminal transition at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_tick(&self, progress: &JobProgress) {
        debug!(
            job = %progress.job,
            query = %progress.query,
            elapsed = %progress.elapsed_text(),
            "Waiting for response"
        );
    }

    fn on_finish(&self, progress: &JobProgress, state: JobState) {
        match state {
            JobState::Completed => info!(
                job = %progress.job,
                query = %progress.query,
                "{} {}",
                progress.query.completion_label(),
                progress.elapsed_text()
            ),
            _ => info!(
                job = %progress.job,
                query = %progress.query,
                state = %state,
                elapsed = %progress.elapsed_text(),
                "Job ended without a response"
            ),
        }
    }
}
