use crate::error::AppError;
use crate::models::{Notification, SiteList, SyncConfig};
use crate::services::config_store::ConfigStore;
use crate::services::sync_service::{self, SyncSettingsHandle};
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use webdav_sync::{SyncError, Transport, WebDavSyncClient};

/// Result of the startup restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Sync is not enabled
    Disabled,
    /// Restore already ran in this process
    AlreadyDone,
    /// No remote copy or an empty one; the local list is kept
    RemoteEmpty,
    /// Local list replaced with this many remote sites
    Restored(usize),
    /// Download or local save failed; the local list is kept
    Failed(String),
}

/// Connects local saves and application start to the WebDAV client.
///
/// Failures of awaited calls (`configure`, `test_connection`, `manual_sync`)
/// are returned to the caller. Failures of background work (auto-sync,
/// startup restore) are logged and turned into a notification. The local
/// list stays the source of truth either way.
pub struct SyncCoordinator<T: Transport + 'static> {
    client: Arc<WebDavSyncClient<T>>,
    settings: SyncSettingsHandle,
    notifier: UnboundedSender<Notification>,
    restored: AtomicBool,
}

impl<T: Transport + 'static> SyncCoordinator<T> {
    pub fn new(
        client: WebDavSyncClient<T>,
        settings: SyncSettingsHandle,
        notifier: UnboundedSender<Notification>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            settings,
            notifier,
            restored: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &SyncSettingsHandle {
        &self.settings
    }

    /// Tests the candidate settings and stores them when the server answers.
    ///
    /// A missing collection (404) is accepted: it is created on the first upload.
    pub async fn configure(
        &self,
        conn: &Connection,
        candidate: SyncConfig,
    ) -> Result<SyncConfig, AppError> {
        let candidate = candidate.with_trailing_separator();

        match self.client.test_connection(&candidate).await {
            Ok(()) => {}
            Err(SyncError::PathNotFound) => {
                log::info!(
                    "Remote directory {} does not exist yet, it will be created on first upload",
                    candidate.server
                );
            }
            Err(e) => return Err(e.into()),
        }

        let saved = sync_service::save_sync_config(conn, &candidate)?;
        self.settings.publish(saved.clone());
        self.notify(Notification::success("WebDAV settings saved"));
        Ok(saved)
    }

    /// Tests the current settings
    pub async fn test_connection(&self) -> Result<(), AppError> {
        let config = self.settings.snapshot();
        self.client.test_connection(&config).await?;
        self.notify(Notification::success("WebDAV connection works"));
        Ok(())
    }

    pub fn set_auto_sync(&self, conn: &Connection, enabled: bool) -> Result<(), AppError> {
        sync_service::set_auto_sync(conn, enabled)?;
        let mut config = self.settings.snapshot();
        config.auto_sync = enabled;
        self.settings.publish(config);
        Ok(())
    }

    /// Forgets server and credentials; the auto-sync preference survives
    pub fn clear(&self, conn: &Connection) -> Result<(), AppError> {
        sync_service::clear_sync_config(conn)?;
        let auto_sync = self.settings.snapshot().auto_sync;
        self.settings.publish(SyncConfig {
            auto_sync,
            ..SyncConfig::default()
        });
        Ok(())
    }

    /// Hook for after a successful local save.
    ///
    /// When sync and auto-sync are on, uploads `sites` in a background task
    /// and reports the outcome as a notification. No retry, no rollback.
    /// Returns the task handle, or `None` when auto-sync is off.
    pub fn after_local_save(&self, sites: &SiteList) -> Option<JoinHandle<Result<(), SyncError>>> {
        let config = self.settings.snapshot();
        if !config.is_auto_sync_active() {
            return None;
        }

        let client = Arc::clone(&self.client);
        let notifier = self.notifier.clone();
        let sites = sites.clone();

        Some(tokio::spawn(async move {
            let result = client.upload(&config, &sites).await;
            let notification = match &result {
                Ok(()) => Notification::success("Configuration synced to WebDAV"),
                Err(e) => {
                    log::warn!("Auto-sync failed: {}", e);
                    Notification::error(format!("Auto-sync failed: {}", e.user_message()))
                }
            };
            let _ = notifier.send(notification);
            result
        }))
    }

    /// User-triggered upload of the current list
    pub async fn manual_sync(&self, conn: &Connection, sites: &SiteList) -> Result<(), AppError> {
        let config = self.settings.snapshot();
        match self.client.upload(&config, sites).await {
            Ok(()) => {
                if let Err(e) = sync_service::record_last_sync(conn) {
                    log::warn!("Could not record last sync time: {}", e);
                }
                self.notify(Notification::success("Configuration synced to WebDAV"));
                Ok(())
            }
            Err(e) => {
                log::error!("Manual sync failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Refreshes the local list from the remote copy, once per process.
    ///
    /// Only a non-empty remote list replaces the local one. The store stays
    /// borrowed for the whole download, so no local edit can interleave.
    pub async fn restore_on_startup(&self, store: &mut ConfigStore) -> RestoreOutcome {
        if self.restored.swap(true, Ordering::SeqCst) {
            return RestoreOutcome::AlreadyDone;
        }

        let config = self.settings.snapshot();
        if !config.sync_enabled {
            return RestoreOutcome::Disabled;
        }

        let remote = match self.client.download(&config).await {
            Ok(remote) => remote,
            Err(e) => {
                log::warn!("Restoring from WebDAV failed: {}", e);
                self.notify(Notification::error(format!(
                    "Loading the cloud configuration failed: {}",
                    e.user_message()
                )));
                return RestoreOutcome::Failed(e.user_message());
            }
        };

        if remote.is_empty() {
            log::info!("Remote configuration is empty, keeping local sites");
            return RestoreOutcome::RemoteEmpty;
        }

        let count = remote.len();
        if let Err(e) = store.commit(remote) {
            let err = AppError::from(e);
            log::error!("Could not save restored sites: {}", err);
            self.notify(Notification::error(err.user_message()));
            return RestoreOutcome::Failed(err.user_message());
        }
        if let Err(e) = sync_service::record_last_sync(store.conn()) {
            log::warn!("Could not record last sync time: {}", e);
        }

        self.notify(Notification::info(format!(
            "Loaded {} sites from the cloud",
            count
        )));
        RestoreOutcome::Restored(count)
    }

    fn notify(&self, notification: Notification) {
        // receiver gone means nobody is listening anymore
        let _ = self.notifier.send(notification);
    }
}
