//! HTTP transport abstraction for the WebDAV client.
//!
//! The client only needs "send one request, get status and body back".
//! `HttpTransport` does that with reqwest, `MockTransport` replays queued
//! responses and records what was sent.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;

/// WebDAV verbs used by the sync client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DavMethod {
    /// Directory metadata probe (sent with `Depth: 0`)
    Propfind,
    /// Capability discovery
    Options,
    /// Collection creation
    Mkcol,
    Get,
    Put,
}

impl DavMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DavMethod::Propfind => "PROPFIND",
            DavMethod::Options => "OPTIONS",
            DavMethod::Mkcol => "MKCOL",
            DavMethod::Get => "GET",
            DavMethod::Put => "PUT",
        }
    }
}

impl std::fmt::Display for DavMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outgoing request
#[derive(Clone)]
pub struct DavRequest {
    pub method: DavMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl DavRequest {
    pub fn new(method: DavMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Header values are left out, they carry the Authorization secret.
impl std::fmt::Debug for DavRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("DavRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// Status code and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl DavResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn with_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx, which includes 201 Created and 207 Multi-Status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, `None` when empty
    pub fn text(&self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.body).trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Failure before any HTTP status was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// DNS, refused connection, TLS handshake
    Connect(String),
    Timeout(String),
    /// Request could not be built or the body could not be read
    Request(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Connect(msg) => write!(f, "connection failed: {}", msg),
            TransportError::Timeout(msg) => write!(f, "timed out: {}", msg),
            TransportError::Request(msg) => write!(f, "request failed: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Sends WebDAV requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns whatever status the server answered with.
    ///
    /// Non-success statuses are *not* errors at this layer.
    async fn send(&self, request: DavRequest) -> Result<DavResponse, TransportError>;
}
