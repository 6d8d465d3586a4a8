pub mod background_sync;
pub mod config_store;
pub mod export_import_service;
pub mod site_service;
pub mod sync_service;

pub use background_sync::{RestoreOutcome, SyncCoordinator};
pub use config_store::ConfigStore;
pub use sync_service::SyncSettingsHandle;
