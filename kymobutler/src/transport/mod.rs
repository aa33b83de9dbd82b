//! Network seam between the job lifecycle and the analysis service.
//!
//! [`Transport`] posts one multipart form and returns the raw response body.
//! The production implementation is [`ReqwestTransport`]; tests inject
//! their own implementations.

mod error;
mod form;
mod http;

pub use error::TransportError;
pub use form::{FormPart, FormValue, MultipartForm};
pub use http::{ReqwestTransport, DEFAULT_CONNECT_TIMEOUT, USER_AGENT};

use std::future::Future;

/// Posts multipart forms to the analysis service.
///
/// Implementations must tolerate their future being dropped at any await
/// point: this is how a timed-out or cancelled job aborts the request.
pub trait Transport: Send + Sync {
    /// Posts `form` to `url` and returns the response body.
    ///
    /// A non-success HTTP status is reported as [`TransportError::Status`].
    fn post_form(
        &self,
        url: &str,
        form: MultipartForm,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// How the mock answers.
    #[derive(Clone)]
    pub enum MockBehavior {
        Respond(Vec<u8>),
        Fail(TransportError),
        /// Never answers; only an abort ends the call.
        Silent,
    }

    /// Increments a counter when the request future is dropped.
    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Mock transport for job and client tests.
    #[derive(Clone)]
    pub struct MockTransport {
        pub behavior: MockBehavior,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
        pub dropped: Arc<AtomicUsize>,
        pub started: Arc<Notify>,
        pub forms: Arc<Mutex<Vec<(String, MultipartForm)>>>,
    }

    impl MockTransport {
        fn with_behavior(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
                dropped: Arc::new(AtomicUsize::new(0)),
                started: Arc::new(Notify::new()),
                forms: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn responding(body: impl Into<Vec<u8>>) -> Self {
            Self::with_behavior(MockBehavior::Respond(body.into()))
        }

        pub fn failing(error: TransportError) -> Self {
            Self::with_behavior(MockBehavior::Fail(error))
        }

        pub fn silent() -> Self {
            Self::with_behavior(MockBehavior::Silent)
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn drop_count(&self) -> usize {
            self.dropped.load(Ordering::SeqCst)
        }

        /// Last form posted, with its URL.
        pub fn last_form(&self) -> Option<(String, MultipartForm)> {
            self.forms.lock().last().cloned()
        }
    }

    impl Transport for MockTransport {
        async fn post_form(
            &self,
            url: &str,
            form: MultipartForm,
        ) -> Result<Vec<u8>, TransportError> {
            let _guard = DropCounter(Arc::clone(&self.dropped));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.forms.lock().push((url.to_string(), form));
            self.started.notify_one();

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match &self.behavior {
                MockBehavior::Respond(body) => Ok(body.clone()),
                MockBehavior::Fail(error) => Err(error.clone()),
                MockBehavior::Silent => std::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn test_mock_records_form() {
        let mock = MockTransport::responding(b"{}".to_vec());
        let body = mock
            .post_form("http://svc", MultipartForm::new().text("query", "stats"))
            .await
            .unwrap();

        assert_eq!(body, b"{}");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.drop_count(), 1);
        let (url, form) = mock.last_form().unwrap();
        assert_eq!(url, "http://svc");
        assert_eq!(form.get_text("query"), Some("stats"));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockTransport::failing(TransportError::Request("refused".into()));
        let result = mock.post_form("http://svc", MultipartForm::new()).await;
        assert_eq!(result, Err(TransportError::Request("refused".into())));
    }
}
