//! Namespaced string key/value storage on top of the `local_storage` table.

use crate::error::StoreError;
use rusqlite::{Connection, OptionalExtension};

/// Site list as a compact JSON array
pub const SITES_KEY: &str = "quickReleaseVideoSites";
/// Present once the first start has been handled
pub const FIRST_RUN_KEY: &str = "quickReleaseVideoFirstRun";

pub const WEBDAV_SERVER_KEY: &str = "webdav_server";
pub const WEBDAV_USERNAME_KEY: &str = "webdav_username";
pub const WEBDAV_PASSWORD_KEY: &str = "webdav_password";
/// `"true"` / `"false"`
pub const WEBDAV_ENABLED_KEY: &str = "webdav_enabled";
/// `"true"` / `"false"`, absent means `"true"`
pub const WEBDAV_AUTO_SYNC_KEY: &str = "webdav_auto_sync";
/// RFC 3339 timestamp of the last successful transfer
pub const WEBDAV_LAST_SYNC_KEY: &str = "webdav_last_sync";

pub fn get_item(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    set_items(conn, &[(key, value)])
}

/// Writes all pairs in one transaction. On failure nothing is changed.
pub fn set_items(conn: &Connection, items: &[(&str, &str)]) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction()?;
    for (key, value) in items {
        tx.execute(
            "INSERT INTO local_storage (key, value, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (*key, *value),
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Removes all keys in one transaction
pub fn remove_items(conn: &Connection, keys: &[&str]) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction()?;
    for key in keys {
        tx.execute("DELETE FROM local_storage WHERE key = ?1", [*key])?;
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_set_and_get_item() {
        let conn = setup_test_db();
        assert_eq!(get_item(&conn, SITES_KEY).unwrap(), None);

        set_item(&conn, SITES_KEY, "[]").unwrap();
        assert_eq!(get_item(&conn, SITES_KEY).unwrap(), Some("[]".to_string()));

        set_item(&conn, SITES_KEY, "[1]").unwrap();
        assert_eq!(get_item(&conn, SITES_KEY).unwrap(), Some("[1]".to_string()));
    }

    #[test]
    fn test_remove_items() {
        let conn = setup_test_db();
        set_items(
            &conn,
            &[(WEBDAV_SERVER_KEY, "https://x/"), (WEBDAV_USERNAME_KEY, "u")],
        )
        .unwrap();

        remove_items(&conn, &[WEBDAV_SERVER_KEY, WEBDAV_USERNAME_KEY]).unwrap();
        assert_eq!(get_item(&conn, WEBDAV_SERVER_KEY).unwrap(), None);
        assert_eq!(get_item(&conn, WEBDAV_USERNAME_KEY).unwrap(), None);
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let conn = setup_test_db();
        set_item(&conn, SITES_KEY, "old").unwrap();

        // Reject writes of one specific value to force a failure mid-transaction
        conn.execute_batch(
            "CREATE TRIGGER reject_bad BEFORE UPDATE ON local_storage
             WHEN NEW.value = 'bad'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let err = set_items(&conn, &[(FIRST_RUN_KEY, "done"), (SITES_KEY, "bad")]).unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
        assert_eq!(get_item(&conn, SITES_KEY).unwrap(), Some("old".to_string()));
        assert_eq!(get_item(&conn, FIRST_RUN_KEY).unwrap(), None);
    }
}
