use crate::database::local_storage::{self, FIRST_RUN_KEY, SITES_KEY};
use crate::error::{AppError, StoreError};
use crate::models::SiteList;
use rusqlite::Connection;

/// In-memory site list plus its durable mirror.
///
/// `save` only writes the mirror, `replace` only assigns the in-memory list.
/// `commit` does both in that order, so a failed write never leaves an
/// uncommitted list in memory.
pub struct ConfigStore {
    conn: Connection,
    sites: SiteList,
    load_error: Option<StoreError>,
}

impl ConfigStore {
    /// Wraps an initialized connection and loads the stored list
    pub fn open(conn: Connection) -> Self {
        let mut store = Self {
            conn,
            sites: SiteList::new(),
            load_error: None,
        };
        store.load();
        store
    }

    /// Re-reads the mirror. Unreadable data yields an empty list and is
    /// reported through `load_error`, it never fails the caller.
    pub fn load(&mut self) -> SiteList {
        let (sites, load_error) = match read_sites(&self.conn) {
            Ok(sites) => (sites, None),
            Err(e) => {
                log::error!("Could not load stored sites, starting empty: {}", e);
                (SiteList::new(), Some(e))
            }
        };
        self.sites = sites.clone();
        self.load_error = load_error;
        sites
    }

    /// Writes `sites` to the mirror. On failure the previous value stays stored.
    pub fn save(&self, sites: &SiteList) -> Result<(), StoreError> {
        let json = sites
            .to_json()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        local_storage::set_item(&self.conn, SITES_KEY, &json)?;
        log::debug!("Saved {} sites locally", sites.len());
        Ok(())
    }

    /// Bulk-assigns the in-memory list (import, cloud restore)
    pub fn replace(&mut self, sites: SiteList) {
        self.sites = sites;
    }

    /// Persists, then assigns
    pub fn commit(&mut self, sites: SiteList) -> Result<(), StoreError> {
        self.save(&sites)?;
        self.replace(sites);
        Ok(())
    }

    pub fn sites(&self) -> &SiteList {
        &self.sites
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Error of the last `load`, if the stored value was unreadable
    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    pub fn is_first_run(&self) -> Result<bool, AppError> {
        Ok(local_storage::get_item(&self.conn, FIRST_RUN_KEY)?.is_none())
    }

    pub fn mark_first_run_done(&self) -> Result<(), StoreError> {
        local_storage::set_item(&self.conn, FIRST_RUN_KEY, "false")
    }
}

fn read_sites(conn: &Connection) -> Result<SiteList, StoreError> {
    let stored = local_storage::get_item(conn, SITES_KEY)
        .map_err(|e| StoreError::Corrupted(e.to_string()))?;
    match stored {
        Some(json) => SiteList::from_json(&json).map_err(|e| StoreError::Corrupted(e.to_string())),
        None => Ok(SiteList::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::models::SiteEntry;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    fn sample() -> SiteList {
        SiteList::from(vec![
            SiteEntry::new("Bilibili", "https://member.bilibili.com").unwrap(),
            SiteEntry::new("Douyin", "creator.douyin.com").unwrap(),
        ])
    }

    #[test]
    fn test_empty_store_loads_empty_list() {
        let store = ConfigStore::open(setup_test_db());
        assert!(store.sites().is_empty());
        assert!(store.load_error().is_none());
    }

    #[test]
    fn test_commit_persists_and_reloads() {
        let mut store = ConfigStore::open(setup_test_db());
        store.commit(sample()).unwrap();
        assert_eq!(store.sites(), &sample());

        store.replace(SiteList::new());
        assert_eq!(store.load(), sample());
        assert_eq!(store.sites(), &sample());
    }

    #[test]
    fn test_replace_does_not_persist() {
        let mut store = ConfigStore::open(setup_test_db());
        store.replace(sample());
        assert_eq!(store.sites().len(), 2);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupted_mirror_loads_empty_with_error() {
        let conn = setup_test_db();
        local_storage::set_item(&conn, SITES_KEY, "{not json").unwrap();

        let store = ConfigStore::open(conn);
        assert!(store.sites().is_empty());
        assert!(matches!(store.load_error(), Some(StoreError::Corrupted(_))));
    }

    #[test]
    fn test_failed_save_keeps_memory_and_mirror() {
        let mut store = ConfigStore::open(setup_test_db());
        store.commit(sample()).unwrap();

        store
            .conn()
            .execute_batch(
                "CREATE TRIGGER read_only BEFORE UPDATE ON local_storage
                 BEGIN SELECT RAISE(ABORT, 'read only'); END;",
            )
            .unwrap();

        let err = store.commit(SiteList::new()).unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
        assert_eq!(store.sites(), &sample());
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn test_first_run_flag() {
        let store = ConfigStore::open(setup_test_db());
        assert!(store.is_first_run().unwrap());
        store.mark_first_run_done().unwrap();
        assert!(!store.is_first_run().unwrap());
    }
}
