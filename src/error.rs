use std::fmt;
use webdav_sync::{SyncError, ValidationError};

/// Central error types for the Quick Release app
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Validation error (e.g. invalid inputs)
    Validation(String),
    /// Resource not found
    NotFound(String),
    /// The local mirror could not be written
    Store(StoreError),
    /// WebDAV sync error
    Sync(SyncError),
    /// General error
    Other(String),
}

/// Failures of the durable local mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The storage is full
    QuotaExceeded,
    /// Any other write failure; the previous value is kept
    WriteFailed(String),
    /// The stored value could not be read back
    Corrupted(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Store(e) => write!(f, "Storage error: {}", e),
            AppError::Sync(e) => write!(f, "Sync error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::QuotaExceeded => write!(f, "storage quota exceeded"),
            StoreError::WriteFailed(msg) => write!(f, "write failed: {}", msg),
            StoreError::Corrupted(msg) => write!(f, "stored data is corrupted: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl std::error::Error for StoreError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        AppError::Sync(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::DiskFull => {
                StoreError::QuotaExceeded
            }
            _ => StoreError::WriteFailed(e.to_string()),
        }
    }
}

/// User-friendly error messages for notifications
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check the path and permissions.".to_string()
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => format!("{} was not found.", msg),
            AppError::Store(StoreError::QuotaExceeded) => {
                "Local storage is full. The change was not saved.".to_string()
            }
            AppError::Store(_) => "Saving locally failed. The change was not saved.".to_string(),
            AppError::Sync(e) => e.user_message(),
            AppError::Other(msg) => msg.clone(),
        }
    }
}
