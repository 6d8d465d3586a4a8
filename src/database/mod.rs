pub mod local_storage;
pub mod schema;

use crate::error::AppError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Default location of the local mirror
pub fn default_database_path() -> PathBuf {
    PathBuf::from("./data/quick_release.db")
}

/// Opens (and creates if needed) the database with the complete schema
pub fn init_database(db_path: &Path) -> Result<Connection, AppError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(db_path)?;
    schema::init_schema(&conn)?;

    log::debug!("Opened local storage at {}", db_path.display());
    Ok(conn)
}
