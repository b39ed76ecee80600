use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use super::{PartitionKey, Scope, TagId, partition_key};
use crate::normalizer::TagNormalizer;

/// One persisted label within one scope partition.
///
/// Tags are immutable once created: the stripped `name` keeps the casing of
/// the first request that created the row, while identity within the
/// partition is decided by the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: String,
    scope: Option<Scope>,
    created_at: OffsetDateTime,
}

impl Tag {
    /// Creates a tag value. Rows are normally built by the store.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagspace::{Tag, TagId};
    /// use time::macros::datetime;
    ///
    /// let tag = Tag::new(TagId::new(1), "awesome", None, datetime!(2024-01-01 0:00 UTC));
    /// assert_eq!(tag.id(), TagId::new(1));
    /// assert_eq!(tag.to_string(), "awesome");
    /// ```
    pub fn new(
        id: TagId,
        name: impl Into<String>,
        scope: Option<Scope>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            scope,
            created_at,
        }
    }

    /// Returns the tag's unique identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Returns the stored (stripped) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the normalized form used for identity.
    pub fn name_key(&self) -> String {
        TagNormalizer::normalize(&self.name)
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn partition(&self) -> PartitionKey {
        partition_key(self.scope.as_ref())
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Returns true when `name` denotes this tag, ignoring case and padding.
    pub fn is_named(&self, name: &str) -> bool {
        TagNormalizer::same(&self.name, name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample(name: &str, scope: Option<Scope>) -> Tag {
        Tag::new(TagId::new(1), name, scope, datetime!(2024-12-25 12:00 UTC))
    }

    #[test]
    fn display_returns_name() {
        assert_eq!(sample("cool", None).to_string(), "cool");
    }

    #[test]
    fn is_named_ignores_case_and_whitespace() {
        let tag = sample("Awesome", None);
        assert!(tag.is_named("awesome"));
        assert!(tag.is_named("  AWESOME "));
        assert!(!tag.is_named("awesom"));
    }

    #[test]
    fn name_key_is_normalized() {
        assert_eq!(sample("Cool Tool", None).name_key(), "cool tool");
    }

    #[test]
    fn partition_follows_scope() {
        assert!(sample("x", None).partition().is_global());

        let scoped = sample("x", Some(Scope::new("Community", 3)));
        assert_eq!(scoped.partition().to_string(), "Community#3");
        assert_eq!(scoped.scope(), Some(&Scope::new("Community", 3)));
    }

    #[test]
    fn serializes_with_scope() {
        let tag = sample("rust", Some(Scope::new("Team", 2)));
        let json = serde_json::to_value(&tag).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "rust");
        assert_eq!(json["scope"]["kind"], "Team");
        assert_eq!(json["scope"]["id"], 2);
    }
}
