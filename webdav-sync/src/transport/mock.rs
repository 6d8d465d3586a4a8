//! Mock transport for testing.
//!
//! Replays queued responses in order and records every request it receives.

use super::{DavMethod, DavRequest, DavResponse, Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport for testing.
///
/// Clones share state, so a test can keep one handle while the client owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    responses: VecDeque<Result<DavResponse, TransportError>>,
    requests: Vec<DavRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an empty-bodied response with the given status.
    pub fn queue_status(&self, status: u16) {
        self.queue(Ok(DavResponse::new(status)));
    }

    /// Queue a response with a body.
    pub fn queue_response(&self, status: u16, body: &str) {
        self.queue(Ok(DavResponse::with_body(status, body.as_bytes().to_vec())));
    }

    /// Queue a transport-level failure.
    pub fn queue_failure(&self, error: TransportError) {
        self.queue(Err(error));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<DavRequest> {
        self.lock().requests.clone()
    }

    /// Methods of all requests sent so far, in order.
    pub fn methods(&self) -> Vec<DavMethod> {
        self.lock().requests.iter().map(|r| r.method).collect()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Responses that were queued but never consumed.
    pub fn pending_responses(&self) -> usize {
        self.lock().responses.len()
    }

    fn queue(&self, response: Result<DavResponse, TransportError>) {
        self.lock().responses.push_back(response);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockTransportInner> {
        // poisoned state is still usable
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: DavRequest) -> Result<DavResponse, TransportError> {
        let mut inner = self.lock();
        let method = request.method;
        inner.requests.push(request);
        inner.responses.pop_front().unwrap_or_else(|| {
            Err(TransportError::Request(format!(
                "no mock response queued for {}",
                method
            )))
        })
    }
}
