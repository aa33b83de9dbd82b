//! Deadline and cancellation watchdog for a running job.
//!
//! The watchdog never touches the network. It wakes on every poll interval,
//! checks the caller's cancellation token and the deadline, and reports a
//! progress tick while the job is still waiting.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::progress::{JobProgress, ProgressObserver};
use super::{JobId, Query};

/// Default watchdog poll interval (250 milliseconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shortest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Why the watchdog stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchVerdict {
    /// The transport task signalled it is done.
    Finished,
    /// The caller's token was cancelled.
    Cancelled,
    /// The deadline passed.
    TimedOut(Duration),
}

/// Watches one job until it finishes, is cancelled or times out.
#[derive(Debug, Clone)]
pub struct JobWatchdog {
    job: JobId,
    query: Query,
    timeout: Duration,
    interval: Duration,
}

impl JobWatchdog {
    /// Creates a watchdog with the default poll interval.
    pub fn new(job: JobId, query: Query, timeout: Duration) -> Self {
        Self {
            job,
            query,
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the poll interval, clamped to [`MIN_POLL_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until `done` or `cancel` fires or the deadline passes.
    ///
    /// Never sleeps past the deadline, so a timeout shorter than the poll
    /// interval still fires on time.
    pub async fn watch(
        &self,
        started: Instant,
        cancel: &CancellationToken,
        done: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> WatchVerdict {
        loop {
            if done.is_cancelled() {
                return WatchVerdict::Finished;
            }
            if cancel.is_cancelled() {
                debug!(job = %self.job, "Watchdog: cancellation requested");
                return WatchVerdict::Cancelled;
            }

            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                warn!(
                    job = %self.job,
                    query = %self.query,
                    elapsed_ms = elapsed.as_millis() as u64,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "No response from the service before the deadline"
                );
                return WatchVerdict::TimedOut(elapsed);
            }

            observer.on_tick(&JobProgress {
                job: self.job,
                query: self.query,
                elapsed,
            });

            let nap = self.interval.min(self.timeout - elapsed);
            tokio::select! {
                biased;
                _ = done.cancelled() => {}
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(nap) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::progress::tests::RecordingProgress;

    fn watchdog(timeout_ms: u64) -> JobWatchdog {
        JobWatchdog::new(JobId::next(), Query::Analysis, Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_watchdog_defaults() {
        let dog = watchdog(1_000);
        assert_eq!(dog.interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(dog.timeout(), Duration::from_secs(1));
        assert_eq!(
            dog.with_interval(Duration::ZERO).interval(),
            MIN_POLL_INTERVAL
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_on_deadline_with_tick_per_interval() {
        let progress = RecordingProgress::default();
        let verdict = watchdog(1_000)
            .watch(
                Instant::now(),
                &CancellationToken::new(),
                &CancellationToken::new(),
                &progress,
            )
            .await;

        match verdict {
            WatchVerdict::TimedOut(elapsed) => {
                assert!(elapsed >= Duration::from_secs(1));
                assert!(elapsed < Duration::from_millis(1_010));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(progress.tick_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_timeout_does_not_wait_for_full_tick() {
        let progress = RecordingProgress::default();
        let verdict = watchdog(100)
            .watch(
                Instant::now(),
                &CancellationToken::new(),
                &CancellationToken::new(),
                &progress,
            )
            .await;

        match verdict {
            WatchVerdict::TimedOut(elapsed) => {
                assert!(elapsed >= Duration::from_millis(100));
                assert!(elapsed < Duration::from_millis(250));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(progress.tick_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_between_ticks() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let verdict = watchdog(10_000)
            .watch(started, &cancel, &CancellationToken::new(), &RecordingProgress::default())
            .await;

        assert_eq!(verdict, WatchVerdict::Cancelled);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_done_before_start_reports_finished() {
        let done = CancellationToken::new();
        done.cancel();
        let progress = RecordingProgress::default();

        let verdict = watchdog(10_000)
            .watch(Instant::now(), &CancellationToken::new(), &done, &progress)
            .await;

        assert_eq!(verdict, WatchVerdict::Finished);
        assert_eq!(progress.tick_count(), 0);
    }
}
