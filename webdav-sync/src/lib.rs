//! # WebDAV Sync
//!
//! Synchronizes the Quick Release site list with a single JSON document on a
//! WebDAV server.
//!
//! This crate provides:
//! - The site list data contract (`SiteEntry`, `SiteList`) with explicit
//!   parse-and-validate of the JSON array form
//! - `SyncConfig`, the immutable WebDAV endpoint settings
//! - A small transport abstraction (`Transport`) with a reqwest backend and
//!   a mock for tests
//! - `WebDavSyncClient`: connection test, collection ensure, upload, download
//!
//! ## Separation of Concerns
//!
//! This crate does **not**:
//! - Persist the site list or the sync settings (handled by the application)
//! - Decide when to sync (auto-sync and startup restore live in the application)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use webdav_sync::{HttpTransport, SiteList, SyncConfig, WebDavSyncClient};
//!
//! let client = WebDavSyncClient::new(HttpTransport::new()?)
//!     .with_page_origin("https://tools.example.com/");
//!
//! let mut config = SyncConfig::new("https://dav.example.com/dav", "alice", "secret");
//! config.sync_enabled = true;
//!
//! client.test_connection(&config).await?;
//! client.upload(&config, &sites).await?;
//! let remote: SiteList = client.download(&config).await?;
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{is_mixed_content, WebDavSyncClient};
pub use error::{SyncError, ValidationError};
pub use models::{normalize_url, SiteEntry, SiteList, SyncConfig, REMOTE_FILE_NAME};
pub use transport::{
    DavMethod, DavRequest, DavResponse, HttpTransport, MockTransport, Transport, TransportError,
};
