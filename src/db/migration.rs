use rusqlite::{Connection, TransactionBehavior};
use time::OffsetDateTime;

use super::schema::{MIGRATIONS_TABLE, TAGGINGS_TABLE, TAGS_TABLE};
use crate::error::Result;

/// Individual migration with version metadata.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

impl Migration {
    /// Creates a new migration.
    pub const fn new(version: u32, description: &'static str, up: &'static str) -> Self {
        Self {
            version,
            description,
            up,
        }
    }

    /// Checks if this migration has been applied to the database.
    pub fn is_applied(&self, conn: &Connection) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?1)",
            [self.version],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Applies this migration unless another connection already did.
    ///
    /// Runs in an IMMEDIATE transaction so concurrent openers of the same
    /// file serialize on the write lock; the applied check happens inside it.
    /// Returns true when this call applied the migration.
    pub fn apply(&self, conn: &mut Connection) -> Result<bool> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if self.is_applied(&tx)? {
            return Ok(false);
        }

        tx.execute_batch(self.up)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                self.version,
                OffsetDateTime::now_utc().unix_timestamp(),
                self.description
            ],
        )?;

        tx.commit()?;
        Ok(true)
    }
}

/// Registry of all migrations in version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "Create tags table with partitioned case-insensitive unique index",
        TAGS_TABLE,
    ),
    Migration::new(
        2,
        "Create taggings table cascading on tag deletion",
        TAGGINGS_TABLE,
    ),
];

/// Applies all pending migrations to the database.
/// Migrations are applied in version order and are additive-only.
pub fn apply_pending_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(MIGRATIONS_TABLE)?;

    for migration in MIGRATIONS {
        if !migration.is_applied(conn)? && migration.apply(conn)? {
            tracing::info!(
                version = migration.version,
                description = migration.description,
                "applied migration"
            );
        }
    }

    Ok(())
}

/// Returns the versions recorded in `schema_migrations`, ascending.
pub fn applied_versions(conn: &Connection) -> Result<Vec<u32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<u32>>>()?;
    Ok(versions)
}
