//! Job identity, lifecycle states and the terminal outcome slot.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::transport::TransportError;

/// Global counter for generating unique job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a job, used to correlate log lines.
#[derive(Clone, Copy, Hash, Eq, PartialEq)]
pub struct JobId(u64);

impl JobId {
    /// Creates the next unique job ID.
    pub fn next() -> Self {
        Self(JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle state of an analysis job.
///
/// States only move forward:
///
/// ```text
/// Created -> Submitted -> Awaiting -> Completed | Cancelled | TimedOut | TransportFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobState {
    #[default]
    Created,

    /// The form was handed to the transport.
    Submitted,

    /// The watchdog is running.
    Awaiting,

    /// The transport returned a body before any cancellation or timeout.
    Completed,

    /// The caller cancelled the job.
    Cancelled,

    /// The deadline passed without a response.
    TimedOut,

    /// The transport reported an error.
    TransportFailed,
}

impl JobState {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::TimedOut | Self::TransportFailed
        )
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Submitted => 1,
            Self::Awaiting => 2,
            Self::Completed | Self::Cancelled | Self::TimedOut | Self::TransportFailed => 3,
        }
    }

    /// Returns true when moving from `self` to `next` is a legal transition.
    ///
    /// Terminal states accept no transition, not even to themselves.
    pub fn can_advance_to(&self, next: JobState) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Submitted => write!(f, "Submitted"),
            Self::Awaiting => write!(f, "Awaiting"),
            Self::Completed => write!(f, "Completed"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::TimedOut => write!(f, "TimedOut"),
            Self::TransportFailed => write!(f, "TransportFailed"),
        }
    }
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Raw response body.
    Completed(Vec<u8>),
    Cancelled,
    TimedOut { elapsed: Duration },
    TransportFailed(TransportError),
}

impl JobOutcome {
    /// Terminal state matching this outcome.
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed(_) => JobState::Completed,
            Self::Cancelled => JobState::Cancelled,
            Self::TimedOut { .. } => JobState::TimedOut,
            Self::TransportFailed(_) => JobState::TransportFailed,
        }
    }
}

/// Single-assignment holder for a job outcome.
///
/// Shared by the transport task and the watchdog. The first writer wins and
/// every later write is rejected, so the outcome never changes once set.
#[derive(Debug, Default)]
pub struct OutcomeSlot {
    inner: Mutex<Option<JobOutcome>>,
}

impl OutcomeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `outcome` if the slot is empty. Returns true if it was stored.
    pub fn try_set(&self, outcome: JobOutcome) -> bool {
        let mut slot = self.inner.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        true
    }

    pub fn is_set(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Terminal state of the stored outcome, if any.
    pub fn state(&self) -> Option<JobState> {
        self.inner.lock().as_ref().map(JobOutcome::state)
    }

    /// Removes and returns the outcome.
    pub fn take(&self) -> Option<JobOutcome> {
        self.inner.lock().take()
    }
}
