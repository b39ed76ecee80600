//! Scoped, case-insensitive tag resolution backed by SQLite.
//!
//! Tags live in partitions: the global partition, or one per owning entity
//! ([`Scope`]). Within a partition a name is unique after stripping and
//! lowercasing, and [`TagResolver`] turns user-supplied names into persisted
//! tags, creating the missing ones.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod registry;
pub mod resolver;
pub mod store;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use db::Database;
pub use error::{Result, TagError};
pub use models::{PartitionKey, Scope, Tag, TagId, partition_key};
pub use normalizer::TagNormalizer;
pub use registry::{Taggable, TaggableConfig, TaggableRegistry};
pub use resolver::TagResolver;
pub use store::{SqliteTagStore, TagSearch, TagStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_accessible_from_crate_root() {
        let db = Database::in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let scope = Scope::new("Community", 3);
        assert_eq!(partition_key(Some(&scope)).to_string(), "Community#3");
        assert!(partition_key(None).is_global());

        assert_eq!(TagNormalizer::normalize("  Rust "), "rust");
        assert_eq!(TagId::new(9).get(), 9);

        let config = TaggableConfig::tags();
        assert!(config.has_context("tags"));
    }

    #[test]
    fn resolver_over_sqlite_store() {
        let store = SqliteTagStore::new(Database::in_memory().unwrap());
        let resolver = TagResolver::new(store);

        let tags = resolver.resolve_many(&["one", "ONE", "two"], None).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(resolver.store().count(None).unwrap(), 2);
    }
}
