use super::{DavRequest, DavResponse, Transport, TransportError};
use async_trait::async_trait;

/// reqwest-backed transport.
///
/// No request timeout is configured; requests rely on the transport defaults.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .user_agent(concat!("QuickRelease/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(format!("Client build failed: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: DavRequest) -> Result<DavResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::Request(format!("Invalid method: {}", e)))?;

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(TransportError::from)?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(format!("Read response failed: {}", e)))?;

        Ok(DavResponse {
            status,
            body: body.to_vec(),
        })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}
