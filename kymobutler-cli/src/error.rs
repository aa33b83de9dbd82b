//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use kymobutler::client::ClientError;
use kymobutler::config::ConfigFileError;
use kymobutler::export::ExportError;
use kymobutler::response::{DecodeError, ResponseDecoder};

/// Exit code used when the user interrupts a request.
const EXIT_INTERRUPTED: i32 = 130;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Request to the analysis service failed or was aborted
    Client(ClientError),
    /// Response could not be decoded
    Decode(DecodeError),
    /// Failed to write results
    Export(ExportError),
    /// Failed to read an input file
    FileRead { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate message and code.
    ///
    /// Cancellations and timeouts are reported as notices, not errors. The
    /// cancellation notice itself comes from the progress display.
    pub fn exit(&self) -> ! {
        match self {
            CliError::Client(ClientError::Cancelled) => process::exit(EXIT_INTERRUPTED),
            CliError::Client(e @ ClientError::TimedOut { .. }) => {
                eprintln!("{}", e);
                eprintln!("Try again later or raise service.timeout in the configuration.");
                process::exit(1)
            }
            _ => {}
        }

        eprintln!("Error: {}", self);
        for line in self.service_details() {
            eprintln!("{}", line);
        }

        match self {
            CliError::Client(ClientError::NotConfigured) => {
                eprintln!();
                eprintln!("Set the service URL with:");
                eprintln!("  kymobutler config set service.url <URL>");
            }
            CliError::Decode(DecodeError::MalformedResponse(_)) => {
                eprintln!();
                eprintln!("The service answered with something other than an analysis result.");
                eprintln!("Run with --debug to keep the raw response for inspection.");
            }
            _ => {}
        }

        process::exit(1)
    }

    /// Explanation the service sent along with an HTTP error, one per line.
    pub fn service_details(&self) -> Vec<String> {
        let decoder = match self {
            CliError::Client(e) => e
                .service_response()
                .and_then(|body| ResponseDecoder::parse(body).ok()),
            _ => None,
        };
        let Some(decoder) = decoder else {
            return Vec::new();
        };

        let mut lines = Vec::new();
        if let Ok(Some(error)) = decoder.error_message() {
            lines.push(format!("Service error: {}", error));
        }
        let summary = decoder.summary();
        lines.extend(summary.lines().map(str::to_string));
        lines
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Client(e) => write!(f, "{}", e),
            CliError::Decode(e) => write!(f, "Failed to decode response: {}", e),
            CliError::Export(e) => write!(f, "Failed to export results: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Client(e) => Some(e),
            CliError::Decode(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ClientError> for CliError {
    fn from(e: ClientError) -> Self {
        CliError::Client(e)
    }
}

impl From<DecodeError> for CliError {
    fn from(e: DecodeError) -> Self {
        CliError::Decode(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kymobutler::transport::TransportError;

    use super::*;

    #[test]
    fn test_timeout_message_has_no_error_prefix() {
        let err = CliError::from(ClientError::TimedOut {
            elapsed: Duration::from_secs(90),
        });
        assert_eq!(err.to_string(), "No response from the service after 01:30");
    }

    #[test]
    fn test_file_read_message() {
        let err = CliError::FileRead {
            path: PathBuf::from("/tmp/missing.png"),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read file '/tmp/missing.png': not found"
        );
    }

    #[test]
    fn test_service_details_from_error_status() {
        let err = CliError::from(ClientError::TransportFailed(TransportError::Status {
            status: 429,
            url: "http://kymobutler.test/api".to_string(),
            body: b"{\n\t\"error\": \"quota exceeded\",\n\t\"messages\": \"try tomorrow\"\n}"
                .to_vec(),
        }));

        assert_eq!(err.to_string(), "HTTP 429 from http://kymobutler.test/api");
        assert_eq!(
            err.service_details(),
            vec![
                "Service error: quota exceeded".to_string(),
                "Messages: try tomorrow".to_string(),
            ]
        );
    }

    #[test]
    fn test_service_details_empty_without_json_body() {
        let plain = CliError::from(ClientError::TransportFailed(TransportError::Status {
            status: 502,
            url: "http://kymobutler.test/api".to_string(),
            body: b"Bad Gateway".to_vec(),
        }));
        assert!(plain.service_details().is_empty());
        assert!(CliError::from(ClientError::Cancelled).service_details().is_empty());
    }
}
