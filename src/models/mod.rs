pub mod notification;

pub use notification::{Notification, NotificationLevel};
pub use webdav_sync::{SiteEntry, SiteList, SyncConfig};
