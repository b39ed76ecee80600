mod migration;
mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::config::{StoreConfig, ensure_database_directory};
use crate::error::Result;

pub use migration::{MIGRATIONS, Migration, applied_versions};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database wrapper providing connection management and schema initialization.
///
/// One `Database` owns one SQLite connection. Concurrent workers each open
/// their own `Database` on the same file; the unique index on `tags` is what
/// keeps them from creating duplicates.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn, DEFAULT_BUSY_TIMEOUT, false)
    }

    /// Opens a file-based SQLite database at the given path with default settings.
    ///
    /// Creates the database file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::initialize(conn, DEFAULT_BUSY_TIMEOUT, true)
    }

    /// Opens the database described by `config`, creating its directory if needed.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self> {
        ensure_database_directory(&config.path)?;
        let conn = Connection::open(&config.path)?;
        Self::initialize(conn, config.busy_timeout, config.wal)
    }

    /// Applies connection pragmas, then pending migrations.
    fn initialize(mut conn: Connection, busy_timeout: Duration, wal: bool) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        if wal {
            let mode: String =
                conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            tracing::debug!(journal_mode = %mode, "configured journal mode");
        }

        migration::apply_pending_migrations(&mut conn)?;

        Ok(Self { conn })
    }

    /// Returns a reference to the underlying connection.
    ///
    /// Useful for executing custom queries in tests or from an association layer.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
