pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid stored value for {field}: {value}")]
    InvalidStored { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Shared handle over one SQLite connection.
///
/// Statements here are short and row counts small; a mutex over a single
/// connection serializes writers the same way SQLite itself would.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_database(path)?),
        })
    }

    /// Open (and migrate) an in-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_memory_database()?),
        })
    }

    /// Run `f` with the connection locked.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}
