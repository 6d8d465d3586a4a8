use crate::error::AppError;
use crate::models::SiteEntry;
use crate::services::config_store::ConfigStore;

/// Appends a site. The URL gets `https://` when no scheme is given and must
/// not already be in the list.
pub fn add_site(store: &mut ConfigStore, name: &str, url: &str) -> Result<SiteEntry, AppError> {
    let entry = SiteEntry::new(name, url)?;

    if store.sites().contains_url(&entry.url) {
        return Err(AppError::Validation(format!(
            "{} is already in the list",
            entry.url
        )));
    }

    let mut sites = store.sites().clone();
    sites.push(entry.clone());
    store.commit(sites)?;

    log::info!("Added site {} ({})", entry.name, entry.url);
    Ok(entry)
}

/// Removes the site at `index` (0-based)
pub fn delete_site(store: &mut ConfigStore, index: usize) -> Result<SiteEntry, AppError> {
    let mut sites = store.sites().clone();
    let removed = sites
        .remove(index)
        .ok_or_else(|| AppError::NotFound(format!("Site #{}", index + 1)))?;
    store.commit(sites)?;

    log::info!("Deleted site {} ({})", removed.name, removed.url);
    Ok(removed)
}

/// Moves the site at `from` to position `to` (both 0-based)
pub fn move_site(store: &mut ConfigStore, from: usize, to: usize) -> Result<(), AppError> {
    let mut sites = store.sites().clone();
    if !sites.move_entry(from, to) {
        let bad = if from >= sites.len() { from } else { to };
        return Err(AppError::NotFound(format!("Site #{}", bad + 1)));
    }
    store.commit(sites)?;

    log::debug!("Moved site {} -> {}", from, to);
    Ok(())
}

/// URLs to open, in list order
pub fn open_all(store: &ConfigStore) -> Result<Vec<String>, AppError> {
    if store.sites().is_empty() {
        return Err(AppError::Validation(
            "Please add a video upload site first".to_string(),
        ));
    }
    Ok(store.sites().urls())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use rusqlite::Connection;

    fn setup_store() -> ConfigStore {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        ConfigStore::open(conn)
    }

    #[test]
    fn test_add_site_normalizes_and_persists() {
        let mut store = setup_store();
        let entry = add_site(&mut store, "Bilibili", "member.bilibili.com").unwrap();
        assert_eq!(entry.url, "https://member.bilibili.com");

        assert_eq!(store.load().urls(), vec!["https://member.bilibili.com"]);
    }

    #[test]
    fn test_add_duplicate_url_is_rejected_without_mutation() {
        let mut store = setup_store();
        add_site(&mut store, "YouTube", "https://studio.youtube.com").unwrap();

        let err = add_site(&mut store, "YouTube again", "studio.youtube.com").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.sites().len(), 1);
        assert_eq!(store.sites().get(0).unwrap().name, "YouTube");
    }

    #[test]
    fn test_add_requires_name_and_url() {
        let mut store = setup_store();
        assert!(add_site(&mut store, "", "https://a").is_err());
        assert!(add_site(&mut store, "A", "   ").is_err());
        assert!(store.sites().is_empty());
    }

    #[test]
    fn test_delete_and_move() {
        let mut store = setup_store();
        add_site(&mut store, "A", "https://a").unwrap();
        add_site(&mut store, "B", "https://b").unwrap();
        add_site(&mut store, "C", "https://c").unwrap();

        move_site(&mut store, 2, 0).unwrap();
        assert_eq!(store.sites().urls(), vec!["https://c", "https://a", "https://b"]);

        let removed = delete_site(&mut store, 1).unwrap();
        assert_eq!(removed.url, "https://a");
        assert_eq!(store.load().urls(), vec!["https://c", "https://b"]);
    }

    #[test]
    fn test_out_of_range_indices() {
        let mut store = setup_store();
        add_site(&mut store, "A", "https://a").unwrap();

        assert!(matches!(delete_site(&mut store, 5), Err(AppError::NotFound(_))));
        assert!(matches!(move_site(&mut store, 0, 3), Err(AppError::NotFound(_))));
        assert_eq!(store.sites().len(), 1);
    }

    #[test]
    fn test_failed_save_is_not_committed() {
        let mut store = setup_store();
        add_site(&mut store, "A", "https://a").unwrap();
        store
            .conn()
            .execute_batch(
                "CREATE TRIGGER read_only BEFORE UPDATE ON local_storage
                 BEGIN SELECT RAISE(ABORT, 'read only'); END;",
            )
            .unwrap();

        let err = add_site(&mut store, "B", "https://b").unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(store.sites().urls(), vec!["https://a"]);
    }

    #[test]
    fn test_failed_delete_is_not_committed() {
        let mut store = setup_store();
        add_site(&mut store, "A", "https://a").unwrap();
        add_site(&mut store, "B", "https://b").unwrap();
        store
            .conn()
            .execute_batch(
                "CREATE TRIGGER read_only BEFORE UPDATE ON local_storage
                 BEGIN SELECT RAISE(ABORT, 'read only'); END;",
            )
            .unwrap();

        let err = delete_site(&mut store, 0).unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(store.sites().urls(), vec!["https://a", "https://b"]);
        assert_eq!(store.load().urls(), vec!["https://a", "https://b"]);
    }

    #[test]
    fn test_open_all() {
        let mut store = setup_store();
        assert!(open_all(&store).is_err());

        add_site(&mut store, "A", "https://a").unwrap();
        add_site(&mut store, "B", "b.example.com").unwrap();
        assert_eq!(
            open_all(&store).unwrap(),
            vec!["https://a", "https://b.example.com"]
        );
    }
}
