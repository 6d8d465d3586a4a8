//! WebDAV client for the single site list document.

use crate::error::SyncError;
use crate::models::{SiteList, SyncConfig};
use crate::transport::{DavMethod, DavRequest, DavResponse, Transport, TransportError};

/// 207 Multi-Status, the regular answer to PROPFIND
pub const MULTI_STATUS: u16 = 207;

/// Statuses meaning "this server does not support the verb"
const VERB_REJECTED: [u16; 2] = [405, 501];

/// A response that passed `interpret_response`
enum Accepted {
    Found(DavResponse),
    NotFound,
}

/// Shared response rule.
///
/// Success (2xx, including 207) is accepted. 404 is accepted as `NotFound`
/// only when the caller tolerates it. 401 and 403 always become
/// authentication errors, everything else a server error with the body text.
fn interpret_response(
    response: DavResponse,
    tolerate_not_found: bool,
) -> Result<Accepted, SyncError> {
    if response.is_success() || response.status == MULTI_STATUS {
        return Ok(Accepted::Found(response));
    }
    match response.status {
        404 if tolerate_not_found => Ok(Accepted::NotFound),
        401 => Err(SyncError::AuthFailed),
        403 => Err(SyncError::AccessDenied),
        status => Err(SyncError::ServerError {
            status,
            body: response.text(),
        }),
    }
}

/// True when a page served over https talks to an http server, which
/// browsers block as mixed content.
pub fn is_mixed_content(page_origin: Option<&str>, server: &str) -> bool {
    let Some(origin) = page_origin else {
        return false;
    };
    let scheme = |url: &str| reqwest::Url::parse(url).ok().map(|u| u.scheme().to_string());
    scheme(origin).as_deref() == Some("https") && scheme(server).as_deref() == Some("http")
}

/// WebDAV sync client.
///
/// Every operation takes the config by reference and clones it first, so a
/// concurrent settings change never affects a request that is already running.
pub struct WebDavSyncClient<T: Transport> {
    transport: T,
    page_origin: Option<String>,
}

impl<T: Transport> WebDavSyncClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            page_origin: None,
        }
    }

    /// Origin of the hosting page, used for the mixed-content hint
    pub fn with_page_origin(mut self, origin: impl Into<String>) -> Self {
        self.page_origin = Some(origin.into());
        self
    }

    /// Checks that the server answers for the configured collection.
    ///
    /// Sends PROPFIND (depth 0) and falls back to OPTIONS when the server
    /// rejects the verb. Never touches the network with incomplete settings.
    pub async fn test_connection(&self, config: &SyncConfig) -> Result<(), SyncError> {
        let config = config.clone();
        validate_config(&config)?;

        log::debug!("Testing WebDAV connection to {}", config.collection_url());

        let mut response = self.send(&config, propfind(&config)).await?;
        if VERB_REJECTED.contains(&response.status) {
            log::debug!(
                "PROPFIND rejected with {}, falling back to OPTIONS",
                response.status
            );
            let options = DavRequest::new(DavMethod::Options, config.collection_url());
            response = self.send(&config, options).await?;
        }

        match interpret_response(response, true) {
            Ok(Accepted::Found(_)) => {
                log::info!("WebDAV connection test succeeded");
                Ok(())
            }
            Ok(Accepted::NotFound) => Err(SyncError::PathNotFound),
            Err(e) => {
                log::warn!("WebDAV connection test failed: {}", e);
                Err(e)
            }
        }
    }

    /// Makes sure the configured collection exists, creating it with MKCOL
    /// when the probe reports 404. Does nothing more when it already exists.
    pub async fn ensure_remote_directory(&self, config: &SyncConfig) -> Result<(), SyncError> {
        let config = config.clone();
        validate_config(&config)?;

        let probe = self.send(&config, propfind(&config)).await?;
        match interpret_response(probe, true) {
            Ok(Accepted::Found(_)) => return Ok(()),
            Ok(Accepted::NotFound) => {}
            Err(SyncError::ServerError { status, .. }) => {
                log::warn!("Remote directory probe failed with status {}", status);
                return Err(SyncError::DirectoryCreateFailed { status });
            }
            Err(e) => return Err(e),
        }

        log::info!("Creating remote directory {}", config.collection_url());
        let mkcol = DavRequest::new(DavMethod::Mkcol, config.collection_url());
        let created = self.send(&config, mkcol).await?;
        match interpret_response(created, false) {
            Ok(_) => Ok(()),
            Err(SyncError::ServerError { status, .. }) => {
                log::warn!("MKCOL failed with status {}", status);
                Err(SyncError::DirectoryCreateFailed { status })
            }
            Err(e) => Err(e),
        }
    }

    /// Replaces the remote document with `sites` (last writer wins).
    ///
    /// The collection is ensured first on every call; if that fails no PUT is sent.
    pub async fn upload(&self, config: &SyncConfig, sites: &SiteList) -> Result<(), SyncError> {
        let config = config.clone();
        if !config.sync_enabled {
            return Err(SyncError::SyncDisabled);
        }
        validate_config(&config)?;

        let body = sites
            .to_json_pretty()
            .map_err(|e| SyncError::Encoding(e.to_string()))?;

        self.ensure_remote_directory(&config).await?;

        let put = DavRequest::new(DavMethod::Put, config.resource_url())
            .header("Content-Type", "application/json")
            .body(body);
        let response = self.send(&config, put).await?;

        match response.status {
            _ if response.is_success() => {
                log::info!(
                    "Uploaded {} sites to {}",
                    sites.len(),
                    config.resource_url()
                );
                Ok(())
            }
            401 => Err(SyncError::AuthFailed),
            403 => Err(SyncError::AccessDenied),
            status => {
                log::warn!("Upload failed with status {}", status);
                Err(SyncError::UploadFailed(status))
            }
        }
    }

    /// Reads the remote document. A missing document yields an empty list.
    pub async fn download(&self, config: &SyncConfig) -> Result<SiteList, SyncError> {
        let config = config.clone();
        if !config.sync_enabled {
            return Err(SyncError::SyncDisabled);
        }
        validate_config(&config)?;

        let get = DavRequest::new(DavMethod::Get, config.resource_url());
        let response = self.send(&config, get).await?;

        let response = match interpret_response(response, true)? {
            Accepted::Found(response) => response,
            Accepted::NotFound => {
                log::info!("No remote configuration yet");
                return Ok(SiteList::new());
            }
        };

        let text = String::from_utf8(response.body)
            .map_err(|e| SyncError::MalformedRemoteData(format!("not UTF-8: {}", e)))?;
        let sites = SiteList::from_json(&text)
            .map_err(|e| SyncError::MalformedRemoteData(e.to_string()))?;

        log::info!("Downloaded {} sites", sites.len());
        Ok(sites)
    }

    async fn send(&self, config: &SyncConfig, request: DavRequest) -> Result<DavResponse, SyncError> {
        // Added here, not in the transport, so MockTransport records it too
        let request = request.header("Authorization", config.authorization_header());
        log::debug!("{} {}", request.method, request.url);
        self.transport
            .send(request)
            .await
            .map_err(|e| self.unreachable(config, e))
    }

    fn unreachable(&self, config: &SyncConfig, error: TransportError) -> SyncError {
        let mixed_content = is_mixed_content(self.page_origin.as_deref(), &config.server);
        log::warn!(
            "WebDAV request did not complete: {} (mixed content: {})",
            error,
            mixed_content
        );
        SyncError::Unreachable {
            detail: error.to_string(),
            mixed_content,
        }
    }
}

fn propfind(config: &SyncConfig) -> DavRequest {
    DavRequest::new(DavMethod::Propfind, config.collection_url()).header("Depth", "0")
}

/// Checks the settings before anything is sent: all fields filled in and an
/// absolute http(s) server URL.
fn validate_config(config: &SyncConfig) -> Result<(), SyncError> {
    if !config.has_credentials() {
        let missing: Vec<&str> = [
            ("server", config.server.trim().is_empty()),
            ("username", config.username.trim().is_empty()),
            ("password", config.password.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(field, _)| field)
        .collect();

        return Err(SyncError::InvalidConfig(format!(
            "missing {}",
            missing.join(", ")
        )));
    }

    match reqwest::Url::parse(config.server.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(SyncError::InvalidServerUrl(config.server.trim().to_string())),
    }
}
