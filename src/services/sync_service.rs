use crate::database::local_storage::{
    self, WEBDAV_AUTO_SYNC_KEY, WEBDAV_ENABLED_KEY, WEBDAV_LAST_SYNC_KEY, WEBDAV_PASSWORD_KEY,
    WEBDAV_SERVER_KEY, WEBDAV_USERNAME_KEY,
};
use crate::error::AppError;
use crate::models::SyncConfig;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tokio::sync::watch;

/// Loads the WebDAV settings. Missing keys fall back to the defaults,
/// `webdav_auto_sync` defaults to on.
pub fn load_sync_config(conn: &Connection) -> Result<SyncConfig, AppError> {
    let get = |key: &str| local_storage::get_item(conn, key);

    Ok(SyncConfig {
        server: get(WEBDAV_SERVER_KEY)?.unwrap_or_default(),
        username: get(WEBDAV_USERNAME_KEY)?.unwrap_or_default(),
        password: get(WEBDAV_PASSWORD_KEY)?.unwrap_or_default(),
        sync_enabled: get(WEBDAV_ENABLED_KEY)?.as_deref() == Some("true"),
        auto_sync: get(WEBDAV_AUTO_SYNC_KEY)?.as_deref() != Some("false"),
    })
}

/// Saves the WebDAV settings and enables sync. Returns the stored value,
/// with the server URL ending in `/`.
pub fn save_sync_config(conn: &Connection, config: &SyncConfig) -> Result<SyncConfig, AppError> {
    let mut saved = config.clone().with_trailing_separator();
    saved.sync_enabled = true;

    local_storage::set_items(
        conn,
        &[
            (WEBDAV_SERVER_KEY, saved.server.as_str()),
            (WEBDAV_USERNAME_KEY, saved.username.as_str()),
            (WEBDAV_PASSWORD_KEY, saved.password.as_str()),
            (WEBDAV_ENABLED_KEY, "true"),
            (WEBDAV_AUTO_SYNC_KEY, bool_str(saved.auto_sync)),
        ],
    )?;

    log::info!("Saved WebDAV settings for {}", saved.server);
    Ok(saved)
}

/// Enables or disables automatic upload after local saves
pub fn set_auto_sync(conn: &Connection, enabled: bool) -> Result<(), AppError> {
    local_storage::set_item(conn, WEBDAV_AUTO_SYNC_KEY, bool_str(enabled))?;
    Ok(())
}

/// Removes server, credentials and the enabled flag.
///
/// The auto-sync preference is kept for the next setup.
pub fn clear_sync_config(conn: &Connection) -> Result<(), AppError> {
    local_storage::remove_items(
        conn,
        &[
            WEBDAV_SERVER_KEY,
            WEBDAV_USERNAME_KEY,
            WEBDAV_PASSWORD_KEY,
            WEBDAV_ENABLED_KEY,
        ],
    )?;
    log::info!("Cleared WebDAV settings");
    Ok(())
}

/// Updates the timestamp of the last successful transfer
pub fn record_last_sync(conn: &Connection) -> Result<(), AppError> {
    local_storage::set_item(conn, WEBDAV_LAST_SYNC_KEY, &Utc::now().to_rfc3339())?;
    Ok(())
}

pub fn last_sync(conn: &Connection) -> Result<Option<DateTime<Utc>>, AppError> {
    let stored = local_storage::get_item(conn, WEBDAV_LAST_SYNC_KEY)?;
    Ok(stored
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Process-wide current settings.
///
/// Holds immutable `SyncConfig` values: readers take a snapshot, writers
/// publish a complete replacement. Clones share the same value.
#[derive(Clone)]
pub struct SyncSettingsHandle {
    sender: std::sync::Arc<watch::Sender<SyncConfig>>,
}

impl SyncSettingsHandle {
    pub fn new(initial: SyncConfig) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self {
            sender: std::sync::Arc::new(sender),
        }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> SyncConfig {
        self.sender.borrow().clone()
    }

    pub fn publish(&self, config: SyncConfig) {
        self.sender.send_replace(config);
    }
}
