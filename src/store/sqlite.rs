use std::collections::HashSet;

use rusqlite::{OptionalExtension, Row, types::Type};
use time::OffsetDateTime;

use super::{TagSearch, TagStore};
use crate::config::StoreConfig;
use crate::db::Database;
use crate::error::{Result, TagError};
use crate::models::{PartitionKey, Scope, Tag, TagId, partition_key};
use crate::normalizer::TagNormalizer;

/// Columns selected for every tag row, in the order `tag_from_row` reads them.
pub(super) const TAG_COLUMNS: &str = "id, name, scoped_type, scoped_id, created_at";

/// Stays under SQLite's host parameter limit for `IN (...)` batches.
const MAX_KEYS_PER_QUERY: usize = 500;

const DEFAULT_SEARCH_PAGE_SIZE: usize = 100;

/// Partition predicate; mirrors the expressions of `idx_tags_partition_name`.
const PARTITION_FILTER: &str = "IFNULL(scoped_type, '') = ?1 AND IFNULL(scoped_id, 0) = ?2";

pub(super) fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let scoped_type: Option<String> = row.get(2)?;
    let scoped_id: Option<i64> = row.get(3)?;
    let created_at: i64 = row.get(4)?;

    let created_at = OffsetDateTime::from_unix_timestamp(created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e)))?;

    let scope = match (scoped_type, scoped_id) {
        (Some(kind), Some(id)) => Some(Scope::new(kind, id)),
        _ => None,
    };

    Ok(Tag::new(TagId::new(id), name, scope, created_at))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// SQLite-backed [`TagStore`].
///
/// # Examples
///
/// ```
/// use tagspace::{Database, Scope, SqliteTagStore, TagStore};
///
/// # fn main() -> tagspace::Result<()> {
/// let store = SqliteTagStore::new(Database::in_memory()?);
/// let community = Scope::new("Community", 1);
///
/// let created = store.create("  Rust ", Some(&community))?;
/// assert_eq!(created.name(), "Rust");
///
/// let found = store.find_exact("RUST", Some(&community))?;
/// assert_eq!(found.map(|t| t.id()), Some(created.id()));
/// assert!(store.find_exact("rust", None)?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct SqliteTagStore {
    db: Database,
    search_page_size: usize,
}

impl SqliteTagStore {
    /// Wraps an open database.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
        }
    }

    /// Opens the configured database file and applies the configured page size.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let db = Database::open_with_config(config)?;
        Ok(Self::new(db).with_search_page_size(config.search_page_size))
    }

    /// Sets how many rows a lazy search fetches per round trip.
    pub fn with_search_page_size(mut self, size: usize) -> Self {
        self.search_page_size = size.max(1);
        self
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the tag with the given id, or `None`.
    pub fn find_by_id(&self, id: TagId) -> Result<Option<Tag>> {
        let tag = self
            .db
            .connection()
            .query_row(
                &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1"),
                [id.get()],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// Returns the tag with the given id.
    ///
    /// # Errors
    ///
    /// Returns `TagError::NotFound` when no such row exists.
    pub fn get(&self, id: TagId) -> Result<Tag> {
        self.find_by_id(id)?.ok_or_else(|| TagError::NotFound(format!("tag id {id}")))
    }

    /// Returns tags matching any of `patterns` as a substring, each row once,
    /// in natural row order.
    pub fn search_any<S: AsRef<str>>(
        &self,
        patterns: &[S],
        scope: Option<&Scope>,
    ) -> Result<Vec<Tag>> {
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for pattern in patterns {
            for tag in self.search(pattern.as_ref(), scope)? {
                let tag = tag?;
                if seen.insert(tag.id()) {
                    matches.push(tag);
                }
            }
        }

        matches.sort_by_key(Tag::id);
        Ok(matches)
    }

    /// Returns every tag in the partition in natural row order.
    pub fn all(&self, scope: Option<&Scope>) -> Result<Vec<Tag>> {
        let partition = partition_key(scope);
        let (kind, id) = partition.index_columns();
        let mut stmt = self.db.connection().prepare_cached(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE {PARTITION_FILTER} ORDER BY id"
        ))?;
        let tags = stmt
            .query_map(rusqlite::params![kind, id], tag_from_row)?
            .collect::<rusqlite::Result<Vec<Tag>>>()?;
        Ok(tags)
    }

    /// Counts the rows in one partition.
    pub fn count(&self, scope: Option<&Scope>) -> Result<u64> {
        let partition = partition_key(scope);
        let (kind, id) = partition.index_columns();
        let count: i64 = self.db.connection().query_row(
            &format!("SELECT COUNT(*) FROM tags WHERE {PARTITION_FILTER}"),
            rusqlite::params![kind, id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn find_keys(&self, partition: &PartitionKey, keys: &[String]) -> Result<Vec<Tag>> {
        let (kind, id) = partition.index_columns();
        let placeholders: Vec<String> = (0..keys.len()).map(|i| format!("?{}", i + 3)).collect();
        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags
             WHERE {PARTITION_FILTER} AND name_key IN ({})
             ORDER BY id",
            placeholders.join(", ")
        );

        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&kind, &id];
        params.extend(keys.iter().map(|k| k as &dyn rusqlite::ToSql));

        let mut stmt = self.db.connection().prepare(&query)?;
        let tags = stmt
            .query_map(params.as_slice(), tag_from_row)?
            .collect::<rusqlite::Result<Vec<Tag>>>()?;
        Ok(tags)
    }
}

impl TagStore for SqliteTagStore {
    fn find_exact(&self, name: &str, scope: Option<&Scope>) -> Result<Option<Tag>> {
        let partition = partition_key(scope);
        let (kind, id) = partition.index_columns();
        let key = TagNormalizer::normalize(name);

        let sql =
            format!("SELECT {TAG_COLUMNS} FROM tags WHERE {PARTITION_FILTER} AND name_key = ?3");
        let tag = self
            .db
            .connection()
            .query_row(
                &sql,
                rusqlite::params![kind, id, key],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    fn find_any(&self, names: &[String], scope: Option<&Scope>) -> Result<Vec<Tag>> {
        let mut seen = HashSet::new();
        let keys: Vec<String> = names
            .iter()
            .map(|name| TagNormalizer::normalize(name))
            .filter(|key| !key.is_empty() && seen.insert(key.clone()))
            .collect();

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let partition = partition_key(scope);
        let mut tags = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(MAX_KEYS_PER_QUERY) {
            tags.extend(self.find_keys(&partition, chunk)?);
        }
        Ok(tags)
    }

    fn search(
        &self,
        pattern: &str,
        scope: Option<&Scope>,
    ) -> Result<Box<dyn Iterator<Item = Result<Tag>> + '_>> {
        Ok(Box::new(TagSearch::new(
            self.db.connection(),
            partition_key(scope),
            TagNormalizer::normalize(pattern),
            self.search_page_size,
        )))
    }

    fn create(&self, name: &str, scope: Option<&Scope>) -> Result<Tag> {
        let stripped = TagNormalizer::validate(name)?;
        if let Some(scope) = scope
            && scope.kind().is_empty()
        {
            return Err(TagError::Validation(
                "scope type cannot be empty".to_string(),
            ));
        }

        let partition = partition_key(scope);
        let (scoped_type, scoped_id) = partition.stored_columns();
        let key = TagNormalizer::normalize(stripped);
        let now = OffsetDateTime::now_utc();
        let created_at = now.replace_nanosecond(0).unwrap_or(now);

        let conn = self.db.connection();
        let inserted = conn.execute(
            "INSERT INTO tags (name, name_key, scoped_type, scoped_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![stripped, key, scoped_type, scoped_id, created_at.unix_timestamp()],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(TagError::Conflict {
                    name: stripped.to_string(),
                    partition,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let id = TagId::new(conn.last_insert_rowid());
        tracing::debug!(tag_id = %id, name = stripped, partition = %partition, "created tag");

        Ok(Tag::new(id, stripped, scope.cloned(), created_at))
    }
}
