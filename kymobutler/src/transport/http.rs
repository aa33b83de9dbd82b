//! reqwest-backed transport.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::{debug, trace, warn};

use super::{FormPart, FormValue, MultipartForm, Transport, TransportError};

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("kymobutler/", env!("CARGO_PKG_VERSION"));

/// Connection establishment limit. The overall response deadline is enforced
/// by the job watchdog, not by the HTTP client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production transport posting multipart forms with reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default connect timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Creates a transport with a custom connect timeout.
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Build(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn to_reqwest_form(form: MultipartForm) -> Form {
        form.into_parts()
            .into_iter()
            .map(FormPart::into_inner)
            .fold(Form::new(), |acc, (name, value)| match value {
                FormValue::Text(text) => acc.text(name, text),
                FormValue::Bytes { data, file_name } => {
                    let body = Part::bytes(data);
                    let body = match file_name {
                        Some(file_name) => body.file_name(file_name),
                        None => body,
                    };
                    acc.part(name, body)
                }
            })
    }
}

impl Transport for ReqwestTransport {
    async fn post_form(&self, url: &str, form: MultipartForm) -> Result<Vec<u8>, TransportError> {
        trace!(
            url = url,
            parts = form.len(),
            bytes = form.payload_size(),
            "HTTP POST request starting"
        );

        let response = match self
            .client
            .post(url)
            .multipart(Self::to_reqwest_form(form))
            .send()
            .await
        {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(TransportError::Request(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            // The service explains refusals in the body; keep it for the caller.
            let body = match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    debug!(url = url, error = %e, "Failed to read error response body");
                    Vec::new()
                }
            };
            warn!(
                url = url,
                status = status.as_u16(),
                bytes = body.len(),
                "HTTP error status"
            );
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(TransportError::Body(e.to_string()))
            }
        }
    }
}
