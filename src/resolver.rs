//! Batch name-to-tag resolution with create-on-miss.
//!
//! The resolver never trusts its own "not found" observation: creation goes
//! through the store's unique index, and a lost race is answered by reading
//! back the winning row.

use std::collections::HashMap;

use crate::error::{Result, TagError};
use crate::models::{Scope, Tag, partition_key};
use crate::normalizer::TagNormalizer;
use crate::registry::{Taggable, TaggableRegistry};
use crate::store::TagStore;

/// Create/re-read rounds before a persistent conflict is surfaced.
const MAX_CREATE_ATTEMPTS: usize = 3;

/// How a missing tag came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Creation {
    Created,
    /// Another writer inserted it first; the winning row was read back.
    Recovered,
}

/// Per-batch counts reported by `resolve_many`.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchStats {
    found: usize,
    created: usize,
    recovered: usize,
}

/// Resolves requested tag names to persisted tags, creating missing ones.
///
/// # Examples
///
/// ```
/// use tagspace::{Database, SqliteTagStore, TagResolver};
///
/// # fn main() -> tagspace::Result<()> {
/// let resolver = TagResolver::new(SqliteTagStore::new(Database::in_memory()?));
///
/// let tags = resolver.resolve_many(&["  awesome ", "Epic", "AWESOME"], None)?;
/// let names: Vec<&str> = tags.iter().map(|t| t.name()).collect();
/// assert_eq!(names, vec!["awesome", "Epic"]);
/// # Ok(())
/// # }
/// ```
pub struct TagResolver<S> {
    store: S,
}

impl<S: TagStore> TagResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves a single name: the first tag whose name contains it, else a new tag.
    ///
    /// The lookup is a substring scan, not an exact match, so `"cool"` returns
    /// an existing `"cool tool"` when that is the first row containing it.
    pub fn resolve_one(&self, name: &str, scope: Option<&Scope>) -> Result<Tag> {
        let stripped = TagNormalizer::validate(name)?;

        if let Some(found) = self.store.search(stripped, scope)?.next() {
            return found;
        }

        self.create_or_fetch(stripped, scope).map(|(tag, _)| tag)
    }

    /// Resolves a batch of names, one tag per distinct normalized name, in
    /// order of first occurrence.
    ///
    /// Blank names fail the whole batch before the store is touched. Names
    /// already present are found with one batched exact-match query; the rest
    /// are created.
    pub fn resolve_many<N: AsRef<str>>(
        &self,
        names: &[N],
        scope: Option<&Scope>,
    ) -> Result<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let (resolved, stats) = self.resolve_batch(names, scope)?;
        tracing::debug!(
            partition = %partition_key(scope),
            requested = names.len(),
            distinct = resolved.len(),
            found = stats.found,
            created = stats.created,
            recovered = stats.recovered,
            "resolved tag batch"
        );

        Ok(resolved)
    }

    fn resolve_batch<N: AsRef<str>>(
        &self,
        names: &[N],
        scope: Option<&Scope>,
    ) -> Result<(Vec<Tag>, BatchStats)> {
        let mut stats = BatchStats::default();
        let requested = TagNormalizer::distinct(names)?;
        let stripped: Vec<String> = requested.iter().map(|(_, name)| name.clone()).collect();

        let mut existing: HashMap<String, Tag> = self
            .store
            .find_any(&stripped, scope)?
            .into_iter()
            .map(|tag| (tag.name_key(), tag))
            .collect();

        let mut resolved = Vec::with_capacity(requested.len());
        for (key, name) in &requested {
            let tag = match existing.remove(key) {
                Some(tag) => {
                    stats.found += 1;
                    tag
                }
                None => {
                    let (tag, creation) = self.create_or_fetch(name, scope)?;
                    match creation {
                        Creation::Created => stats.created += 1,
                        Creation::Recovered => stats.recovered += 1,
                    }
                    tag
                }
            };
            resolved.push(tag);
        }

        Ok((resolved, stats))
    }

    /// Like [`resolve_many`](Self::resolve_many), but pairs every input name
    /// (duplicates included) with the tag it resolved to.
    pub fn resolve_mapping<N: AsRef<str>>(
        &self,
        names: &[N],
        scope: Option<&Scope>,
    ) -> Result<Vec<(String, Tag)>> {
        let tags: HashMap<String, Tag> = self
            .resolve_many(names, scope)?
            .into_iter()
            .map(|tag| (tag.name_key(), tag))
            .collect();

        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                tags.get(&TagNormalizer::normalize(name))
                    .map(|tag| (name.to_string(), tag.clone()))
                    .ok_or_else(|| TagError::NotFound(name.to_string()))
            })
            .collect()
    }

    /// Resolves names for one context of a taggable record, in the record's scope.
    ///
    /// # Errors
    ///
    /// - `TagError::UnknownContext` when `context` is not registered for
    ///   `T::TAGGABLE_TYPE` in `registry`
    /// - `TagError::Validation` when the record's scope does not match the
    ///   scope type the record type registered with
    pub fn resolve_for<T: Taggable, N: AsRef<str>>(
        &self,
        registry: &TaggableRegistry,
        record: &T,
        context: &str,
        names: &[N],
    ) -> Result<Vec<Tag>> {
        registry.ensure_context(T::TAGGABLE_TYPE, context)?;
        let scope = record.tag_scope();
        registry.ensure_scope(T::TAGGABLE_TYPE, scope.as_ref())?;
        self.resolve_many(names, scope.as_ref())
    }

    fn create_or_fetch(&self, name: &str, scope: Option<&Scope>) -> Result<(Tag, Creation)> {
        let mut attempt = 1;
        loop {
            match self.store.create(name, scope) {
                Ok(tag) => return Ok((tag, Creation::Created)),
                Err(err @ TagError::Conflict { .. }) => {
                    if let Some(winner) = self.store.find_exact(name, scope)? {
                        tracing::debug!(
                            name,
                            tag_id = %winner.id(),
                            partition = %partition_key(scope),
                            "recovered from concurrent tag creation"
                        );
                        return Ok((winner, Creation::Recovered));
                    }
                    if attempt >= MAX_CREATE_ATTEMPTS {
                        tracing::warn!(name, attempts = attempt, "tag conflict did not converge");
                        return Err(err);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
