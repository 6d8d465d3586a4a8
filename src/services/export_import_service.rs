// Export/Import of the site list as a standalone JSON file

use crate::error::AppError;
use crate::models::SiteList;
use crate::services::config_store::ConfigStore;
use std::fs;
use std::path::{Path, PathBuf};

/// File name used when no export path is given
pub const DEFAULT_EXPORT_FILE: &str = "quick_release_video_config.json";

/// Writes the current list as pretty JSON. Refuses to export an empty list.
pub fn export_to_file(store: &ConfigStore, path: &Path) -> Result<PathBuf, AppError> {
    if store.sites().is_empty() {
        return Err(AppError::Validation(
            "There is no configuration to export".to_string(),
        ));
    }

    let json = store
        .sites()
        .to_json_pretty()
        .map_err(|e| AppError::Other(format!("Failed to serialize sites: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json)?;

    log::info!("Exported {} sites to {}", store.sites().len(), path.display());
    Ok(path.to_path_buf())
}

/// Validates `json` and replaces the list with it.
///
/// Any invalid element rejects the whole import; the current list stays as it is.
pub fn import_from_str(store: &mut ConfigStore, json: &str) -> Result<usize, AppError> {
    let sites = SiteList::from_json(json)
        .map_err(|e| AppError::Validation(format!("Invalid configuration format: {}", e)))?;
    let count = sites.len();

    store.commit(sites)?;

    log::info!("Imported {} sites", count);
    Ok(count)
}

pub fn import_from_file(store: &mut ConfigStore, path: &Path) -> Result<usize, AppError> {
    let json = fs::read_to_string(path)?;
    import_from_str(store, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::services::site_service;
    use rusqlite::Connection;

    fn setup_store() -> ConfigStore {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        ConfigStore::open(conn)
    }

    #[test]
    fn test_export_then_import_into_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);

        let mut source = setup_store();
        site_service::add_site(&mut source, "Bilibili", "member.bilibili.com").unwrap();
        site_service::add_site(&mut source, "YouTube", "https://studio.youtube.com").unwrap();
        export_to_file(&source, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"));

        let mut target = setup_store();
        assert_eq!(import_from_file(&mut target, &path).unwrap(), 2);
        assert_eq!(target.sites(), source.sites());
        assert_eq!(target.load(), *source.sites());
    }

    #[test]
    fn test_export_refuses_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = setup_store();
        let result = export_to_file(&store, &dir.path().join("out.json"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_import_with_missing_url_is_rejected_in_full() {
        let mut store = setup_store();
        site_service::add_site(&mut store, "Existing", "https://existing").unwrap();

        let result = import_from_str(
            &mut store,
            r#"[{"name":"A","url":"https://a"},{"name":"B"}]"#,
        );

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.sites().urls(), vec!["https://existing"]);
        assert_eq!(store.load().urls(), vec!["https://existing"]);
    }

    #[test]
    fn test_import_not_committed_when_save_fails() {
        let mut store = setup_store();
        site_service::add_site(&mut store, "A", "https://a").unwrap();
        store
            .conn()
            .execute_batch(
                "CREATE TRIGGER read_only BEFORE UPDATE ON local_storage
                 BEGIN SELECT RAISE(ABORT, 'read only'); END;",
            )
            .unwrap();

        let result = import_from_str(&mut store, r#"[{"name":"B","url":"https://b"}]"#);

        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(store.sites().urls(), vec!["https://a"]);
        assert_eq!(store.load().urls(), vec!["https://a"]);
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = setup_store();
        let result = import_from_file(&mut store, &dir.path().join("missing.json"));
        assert!(matches!(result, Err(AppError::Filesystem(_))));
    }
}
