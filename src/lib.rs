//! # Quick Release
//!
//! Keeps an ordered list of named upload sites, persists it locally, opens
//! all of them at once and optionally mirrors the list to a WebDAV server.
//!
//! - `services::config_store`: the in-memory list and its SQLite mirror
//! - `services::site_service`: add / delete / reorder / open-all
//! - `services::export_import_service`: JSON file import and export
//! - `services::sync_service`: stored WebDAV settings
//! - `services::background_sync`: auto-sync, manual sync and startup restore
//!
//! The WebDAV protocol work lives in the `webdav-sync` crate.

pub mod database;
pub mod error;
pub mod models;
pub mod services;

pub use error::{AppError, StoreError};
