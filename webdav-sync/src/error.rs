/// Errors produced by the WebDAV sync client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A required setting (server, username or password) is empty
    InvalidConfig(String),
    /// The server setting is not an absolute http(s) URL
    InvalidServerUrl(String),
    /// The request never produced an HTTP response
    Unreachable {
        detail: String,
        /// The page is served over https while the server URL is http
        mixed_content: bool,
    },
    /// 401: the server rejected the credentials
    AuthFailed,
    /// 403: the credentials are valid but access to the path is forbidden
    AccessDenied,
    /// 404 on an existence check
    PathNotFound,
    /// Any other non-success status
    ServerError { status: u16, body: Option<String> },
    /// The remote collection is missing and could not be created
    DirectoryCreateFailed { status: u16 },
    /// The PUT of the site list was answered with a non-success status
    UploadFailed(u16),
    /// The remote document is not a JSON array of `{name, url}` objects
    MalformedRemoteData(String),
    /// The site list could not be serialized for upload
    Encoding(String),
    /// Sync is switched off in the settings
    SyncDisabled,
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::InvalidConfig(msg) => write!(f, "Invalid WebDAV configuration: {}", msg),
            SyncError::InvalidServerUrl(url) => write!(f, "Not an http(s) URL: {}", url),
            SyncError::Unreachable {
                detail,
                mixed_content,
            } => {
                write!(f, "WebDAV server unreachable: {}", detail)?;
                if *mixed_content {
                    write!(f, " (possibly blocked as mixed content)")?;
                }
                Ok(())
            }
            SyncError::AuthFailed => write!(f, "Authentication failed (HTTP 401)"),
            SyncError::AccessDenied => write!(f, "Access denied (HTTP 403)"),
            SyncError::PathNotFound => write!(f, "WebDAV path not found (HTTP 404)"),
            SyncError::ServerError { status, body } => match body {
                Some(body) => write!(f, "Server error {}: {}", status, body),
                None => write!(f, "Server error {}", status),
            },
            SyncError::DirectoryCreateFailed { status } => {
                write!(f, "Failed to create remote directory, status code: {}", status)
            }
            SyncError::UploadFailed(status) => {
                write!(f, "Upload failed, status code: {}", status)
            }
            SyncError::MalformedRemoteData(msg) => write!(f, "Malformed remote data: {}", msg),
            SyncError::Encoding(msg) => write!(f, "Failed to encode site list: {}", msg),
            SyncError::SyncDisabled => write!(f, "WebDAV sync is not enabled"),
        }
    }
}

impl std::error::Error for SyncError {}

/// User-facing messages for notifications
impl SyncError {
    pub fn user_message(&self) -> String {
        match self {
            SyncError::InvalidConfig(_) => {
                "Please fill in server address, username and password.".to_string()
            }
            SyncError::InvalidServerUrl(_) => {
                "The server address must be a full http:// or https:// URL.".to_string()
            }
            SyncError::Unreachable {
                mixed_content: true,
                ..
            } => "Cannot reach the WebDAV server. This page is served over HTTPS but the server \
                  address uses HTTP, so the browser may be blocking the request as mixed content. \
                  Use an https:// server address."
                .to_string(),
            SyncError::Unreachable { .. } => {
                "Cannot reach the WebDAV server. Please check the server address.".to_string()
            }
            SyncError::AuthFailed => {
                "Authentication failed. Please check username and password.".to_string()
            }
            SyncError::AccessDenied => {
                "Access denied. The account is not allowed to use this path.".to_string()
            }
            SyncError::PathNotFound => {
                "The WebDAV path does not exist. Please check the server address.".to_string()
            }
            SyncError::ServerError { status, .. } => {
                format!("The server returned status code {}.", status)
            }
            SyncError::DirectoryCreateFailed { status } => {
                format!("Could not create the remote directory (status code {}).", status)
            }
            SyncError::UploadFailed(status) => {
                format!("Uploading the configuration failed (status code {}).", status)
            }
            SyncError::MalformedRemoteData(_) => {
                "The remote configuration file has an invalid format.".to_string()
            }
            SyncError::Encoding(_) => "The site list could not be prepared for upload.".to_string(),
            SyncError::SyncDisabled => "WebDAV sync is not enabled.".to_string(),
        }
    }
}

/// Rejection of a site list document or a single entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The text is not valid JSON
    InvalidJson(String),
    /// The document is valid JSON but not an array
    NotAnArray,
    /// Element `index` is not an object
    NotAnObject { index: usize },
    /// A required field is absent, not a string, or empty
    MissingField {
        index: Option<usize>,
        field: &'static str,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidJson(msg) => write!(f, "invalid JSON: {}", msg),
            ValidationError::NotAnArray => write!(f, "expected a JSON array of sites"),
            ValidationError::NotAnObject { index } => {
                write!(f, "entry {} is not an object", index)
            }
            ValidationError::MissingField {
                index: Some(index),
                field,
            } => write!(f, "entry {} is missing a non-empty `{}`", index, field),
            ValidationError::MissingField { index: None, field } => {
                write!(f, "`{}` must not be empty", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_messages_are_distinct() {
        let unauthorized = SyncError::AuthFailed.user_message();
        let forbidden = SyncError::AccessDenied.user_message();
        let generic = SyncError::ServerError {
            status: 500,
            body: None,
        }
        .user_message();

        assert!(unauthorized.contains("username and password"));
        assert_ne!(unauthorized, forbidden);
        assert_ne!(unauthorized, generic);
    }

    #[test]
    fn test_mixed_content_hint() {
        let err = SyncError::Unreachable {
            detail: "connection refused".to_string(),
            mixed_content: true,
        };
        assert!(err.user_message().contains("mixed content"));
        assert!(err.to_string().contains("mixed content"));

        let plain = SyncError::Unreachable {
            detail: "connection refused".to_string(),
            mixed_content: false,
        };
        assert!(!plain.user_message().contains("mixed content"));
    }
}
