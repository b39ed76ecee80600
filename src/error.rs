//! Error types for tag resolution and storage.

use thiserror::Error;

use crate::models::PartitionKey;

/// Result type alias using the crate's [`TagError`].
pub type Result<T> = std::result::Result<T, TagError>;

/// Errors that can occur while normalizing, storing or resolving tags.
#[derive(Debug, Error)]
pub enum TagError {
    /// A tag name (or scope) failed validation, e.g. blank after stripping.
    #[error("Invalid tag: {0}")]
    Validation(String),

    /// The storage unique constraint rejected an insert because another
    /// writer already created the same normalized name in the partition.
    #[error("Tag '{name}' already exists in partition {partition}")]
    Conflict {
        name: String,
        partition: PartitionKey,
    },

    /// A lookup that requires an existing row found nothing.
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// A context was used that the taggable type never registered.
    #[error("Context '{context}' is not registered for taggable type '{taggable_type}'")]
    UnknownContext {
        taggable_type: String,
        context: String,
    },

    /// Invalid store configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// SQLite failure other than a uniqueness race.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system failure while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TagError {
    /// Returns true for uniqueness races the resolver recovers from.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns true for caller input errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scope;

    #[test]
    fn conflict_message_names_tag_and_partition() {
        let err = TagError::Conflict {
            name: "rust".to_string(),
            partition: PartitionKey::from(Some(&Scope::new("Community", 7))),
        };

        assert_eq!(
            err.to_string(),
            "Tag 'rust' already exists in partition Community#7"
        );
        assert!(err.is_conflict());
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_predicate() {
        let err = TagError::Validation("name cannot be blank".to_string());
        assert!(err.is_validation());
        assert!(!err.is_conflict());
    }

    #[test]
    fn rusqlite_errors_convert_into_database_variant() {
        let err: TagError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, TagError::Database(_)));
    }
}
