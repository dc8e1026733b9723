//! Single write connection behind a mutex. Serialized writes, no
//! contention. Safe to call from async tasks: SQLite mutations here are
//! short and the lock is never held across an await point.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use spine_core::errors::SpineResult;

use super::pragmas::apply_pragmas;
use crate::to_store_err;

/// The single write connection.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path) -> SpineResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_store_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> SpineResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_store_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> SpineResult<T>
    where
        F: FnOnce(&Connection) -> SpineResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_store_err(format!("write lock poisoned: {e}")))?;
        f(&guard)
    }
}
