//! End-to-end workflows for record types registered as taggable.

use anyhow::Result;
use tagspace::{
    Database, Scope, SqliteTagStore, StoreConfig, TagError, TagResolver, TagStore, Taggable,
    TaggableConfig, TaggableRegistry,
};
use tempfile::TempDir;

struct User {
    id: i64,
    community_id: i64,
}

impl Taggable for User {
    const TAGGABLE_TYPE: &'static str = "User";

    fn taggable_id(&self) -> i64 {
        self.id
    }

    fn tag_scope(&self) -> Option<Scope> {
        Some(Scope::new("Community", self.community_id))
    }
}

struct Article {
    id: i64,
}

impl Taggable for Article {
    const TAGGABLE_TYPE: &'static str = "Article";

    fn taggable_id(&self) -> i64 {
        self.id
    }
}

fn registry() -> TaggableRegistry {
    let registry = TaggableRegistry::new();
    registry.register(
        User::TAGGABLE_TYPE,
        TaggableConfig::new()
            .contexts(["languages", "skills"])
            .scoped_by("Community"),
    );
    registry.register(Article::TAGGABLE_TYPE, TaggableConfig::tags());
    registry
}

#[test]
fn test_users_in_one_community_share_tags() -> Result<()> {
    let registry = registry();
    let resolver = TagResolver::new(SqliteTagStore::new(Database::in_memory()?));
    let alice = User { id: 1, community_id: 10 };
    let bob = User { id: 2, community_id: 10 };

    let alice_tags = resolver.resolve_for(&registry, &alice, "languages", &["Rust", " go "])?;
    let bob_tags = resolver.resolve_for(&registry, &bob, "skills", &["rust"])?;

    assert_eq!(alice.taggable_id(), 1);
    assert_eq!(bob_tags[0].id(), alice_tags[0].id(), "same community, same tag");
    assert_eq!(alice_tags[1].name(), "go");

    Ok(())
}

#[test]
fn test_communities_keep_separate_namespaces() -> Result<()> {
    let registry = registry();
    let resolver = TagResolver::new(SqliteTagStore::new(Database::in_memory()?));
    let alice = User { id: 1, community_id: 10 };
    let carol = User { id: 3, community_id: 20 };

    let alice_tags = resolver.resolve_for(&registry, &alice, "skills", &["rust"])?;
    let carol_tags = resolver.resolve_for(&registry, &carol, "skills", &["rust"])?;

    assert_ne!(alice_tags[0].id(), carol_tags[0].id());
    assert_eq!(resolver.store().count(Some(&Scope::new("Community", 10)))?, 1);
    assert_eq!(resolver.store().count(Some(&Scope::new("Community", 20)))?, 1);

    Ok(())
}

#[test]
fn test_unscoped_type_uses_global_partition() -> Result<()> {
    let registry = registry();
    let resolver = TagResolver::new(SqliteTagStore::new(Database::in_memory()?));
    let article = Article { id: 5 };

    let tags = resolver.resolve_for(&registry, &article, "tags", &["news", "News"])?;

    assert_eq!(article.taggable_id(), 5);
    assert_eq!(tags.len(), 1);
    assert!(tags[0].partition().is_global());
    assert_eq!(resolver.store().count(None)?, 1);

    Ok(())
}

#[test]
fn test_unknown_context_creates_nothing() -> Result<()> {
    let registry = registry();
    let resolver = TagResolver::new(SqliteTagStore::new(Database::in_memory()?));
    let article = Article { id: 5 };

    let err = resolver
        .resolve_for(&registry, &article, "languages", &["rust"])
        .unwrap_err();

    assert!(matches!(err, TagError::UnknownContext { .. }));
    assert_eq!(resolver.store().count(None)?, 0);

    Ok(())
}

#[test]
fn test_tags_survive_reopening_file_database() -> Result<()> {
    let dir = TempDir::new()?;
    let config = StoreConfig::builder()
        .path(dir.path().join("nested").join("tags.db"))
        .build()?;

    let created = {
        let resolver = TagResolver::new(SqliteTagStore::open(&config)?);
        resolver.resolve_many(&["persistent"], None)?
    };

    let store = SqliteTagStore::open(&config)?;
    let found = store.find_exact("PERSISTENT", None)?;
    assert_eq!(found.as_ref(), created.first());

    Ok(())
}
