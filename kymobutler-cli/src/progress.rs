//! Console progress display.

use std::io::Write;

use kymobutler::job::{JobProgress, JobState, ProgressObserver};

/// Prints the waiting line to stderr and the completion line when done.
///
/// The waiting line is only redrawn when stderr is a terminal.
pub struct ConsoleProgress {
    interactive: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            interactive: atty::is(atty::Stream::Stderr),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Text of the line shown while waiting.
pub fn waiting_line(progress: &JobProgress) -> String {
    format!(
        "Process started {} ago, waiting for response",
        progress.elapsed_text()
    )
}

/// Text of the line shown once a job ends, if any.
pub fn finish_line(progress: &JobProgress, state: JobState) -> Option<String> {
    match state {
        JobState::Completed => Some(format!(
            "{} {}",
            progress.query.completion_label(),
            progress.elapsed_text()
        )),
        JobState::Cancelled => Some("Process cancelled".to_string()),
        // reported by the caller through the returned error
        _ => None,
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_tick(&self, progress: &JobProgress) {
        if self.interactive {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\r{}", waiting_line(progress));
            let _ = stderr.flush();
        }
    }

    fn on_finish(&self, progress: &JobProgress, state: JobState) {
        if self.interactive {
            // clear the waiting line
            eprint!("\r\x1b[2K");
        }
        if let Some(line) = finish_line(progress, state) {
            eprintln!("{}", line);
        }
    }
}
