/// Tag rows and their partitioned uniqueness constraint.
///
/// `name` keeps the stripped, caller-cased label. `name_key` holds the
/// normalizer's output and is the only column compared for identity.
/// The unique index maps NULL scope columns onto `''`/`0` because SQLite
/// treats NULLs as distinct in unique indexes, which would otherwise let
/// duplicate global tags through.
pub const TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    name_key TEXT NOT NULL CHECK (length(name_key) > 0),
    scoped_type TEXT CHECK (scoped_type IS NULL OR length(scoped_type) > 0),
    scoped_id INTEGER,
    created_at INTEGER NOT NULL,
    CHECK ((scoped_type IS NULL) = (scoped_id IS NULL))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_partition_name
    ON tags (IFNULL(scoped_type, ''), IFNULL(scoped_id, 0), name_key);
"#;

/// Association rows owned by the host's tagging layer.
///
/// Deleting a tag removes every tagging that references it.
pub const TAGGINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS taggings (
    id INTEGER PRIMARY KEY,
    tag_id INTEGER NOT NULL,
    taggable_id INTEGER NOT NULL,
    taggable_type TEXT NOT NULL,
    context TEXT NOT NULL,
    tagger_id INTEGER,
    tagger_type TEXT,
    created_at INTEGER,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_taggings_tag ON taggings(tag_id);
CREATE INDEX IF NOT EXISTS idx_taggings_taggable_context
    ON taggings(taggable_id, taggable_type, context);
"#;

/// Bookkeeping for applied migrations.
pub const MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL,
    description TEXT
);
"#;
