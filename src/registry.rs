//! Per-type tagging configuration.
//!
//! A record type opts into tagging by registering a [`TaggableConfig`] under
//! its type identifier and implementing [`Taggable`]. Registration is explicit;
//! nothing is inherited between types.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::error::{Result, TagError};
use crate::models::Scope;

/// Context name used when a type registers without naming any.
pub const DEFAULT_CONTEXT: &str = "tags";

/// Tag contexts and scope type recognized for one taggable record type.
///
/// # Examples
///
/// ```
/// use tagspace::TaggableConfig;
///
/// let config = TaggableConfig::new()
///     .contexts(["languages", "skills"])
///     .scoped_by("Community");
/// assert_eq!(config.context_names(), &["languages", "skills"]);
/// assert_eq!(config.scope_type(), Some("Community"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggableConfig {
    contexts: Vec<String>,
    scope_type: Option<String>,
}

impl TaggableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single `"tags"` context, no scope.
    pub fn tags() -> Self {
        Self::new().context(DEFAULT_CONTEXT)
    }

    /// Adds one context; repeated names are kept once.
    pub fn context(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.contexts.contains(&name) {
            self.contexts.push(name);
        }
        self
    }

    pub fn contexts<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |config, name| config.context(name))
    }

    /// Declares the entity type whose instances own this record's tag namespace.
    pub fn scoped_by(mut self, scope_type: impl Into<String>) -> Self {
        self.scope_type = Some(scope_type.into());
        self
    }

    pub fn context_names(&self) -> &[String] {
        &self.contexts
    }

    pub fn scope_type(&self) -> Option<&str> {
        self.scope_type.as_deref()
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c == name)
    }

    fn merge(&mut self, other: TaggableConfig) {
        for context in other.contexts {
            if !self.contexts.contains(&context) {
                self.contexts.push(context);
            }
        }
        self.scope_type = other.scope_type;
    }
}

/// A record type that can carry tags.
pub trait Taggable {
    /// Identifier the type registers under, e.g. `"User"`.
    const TAGGABLE_TYPE: &'static str;

    fn taggable_id(&self) -> i64;

    /// Entity owning this record's tag namespace; `None` uses the global partition.
    fn tag_scope(&self) -> Option<Scope> {
        None
    }
}

/// Registry of taggable configurations keyed by type identifier.
#[derive(Debug, Default)]
pub struct TaggableRegistry {
    entries: RwLock<HashMap<String, TaggableConfig>>,
}

impl TaggableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static TaggableRegistry {
        static GLOBAL: OnceLock<TaggableRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TaggableRegistry::new)
    }

    /// Registers `config` for `taggable_type`.
    ///
    /// Registering a type again appends any new contexts (keeping existing
    /// order) and replaces the scope type.
    pub fn register(&self, taggable_type: impl Into<String>, config: TaggableConfig) {
        let taggable_type = taggable_type.into();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(&taggable_type) {
            Some(existing) => existing.merge(config),
            None => {
                entries.insert(taggable_type.clone(), config);
            }
        }
        tracing::debug!(taggable_type = %taggable_type, "registered taggable type");
    }

    pub fn is_taggable(&self, taggable_type: &str) -> bool {
        self.read().contains_key(taggable_type)
    }

    pub fn config(&self, taggable_type: &str) -> Option<TaggableConfig> {
        self.read().get(taggable_type).cloned()
    }

    pub fn contexts(&self, taggable_type: &str) -> Vec<String> {
        self.read()
            .get(taggable_type)
            .map(|c| c.contexts.clone())
            .unwrap_or_default()
    }

    /// Checks that `context` is registered for `taggable_type`.
    ///
    /// # Errors
    ///
    /// Returns `TagError::UnknownContext` for unregistered types or contexts.
    pub fn ensure_context(&self, taggable_type: &str, context: &str) -> Result<()> {
        let known = self
            .read()
            .get(taggable_type)
            .is_some_and(|config| config.has_context(context));

        if known {
            Ok(())
        } else {
            Err(TagError::UnknownContext {
                taggable_type: taggable_type.to_string(),
                context: context.to_string(),
            })
        }
    }

    /// Checks that a record's scope matches the scope type `taggable_type`
    /// registered with.
    ///
    /// A type registered without [`TaggableConfig::scoped_by`] only accepts
    /// the global partition; a scoped type only accepts scopes of its kind.
    ///
    /// # Errors
    ///
    /// Returns `TagError::Validation` on any mismatch.
    pub fn ensure_scope(&self, taggable_type: &str, scope: Option<&Scope>) -> Result<()> {
        let entries = self.read();
        let expected = entries.get(taggable_type).and_then(|config| config.scope_type());

        match (expected, scope) {
            (None, None) => Ok(()),
            (Some(kind), Some(scope)) if scope.kind() == kind => Ok(()),
            (expected, scope) => {
                let expected = match expected {
                    Some(kind) => format!("a {kind} scope"),
                    None => "the global partition".to_string(),
                };
                let actual = match scope {
                    Some(scope) => format!("scope {scope}"),
                    None => "the global partition".to_string(),
                };
                Err(TagError::Validation(format!(
                    "taggable type '{taggable_type}' expects {expected}, got {actual}"
                )))
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, TaggableConfig>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_config_has_default_context() {
        let config = TaggableConfig::tags();
        assert_eq!(config.context_names(), &[DEFAULT_CONTEXT]);
        assert_eq!(config.scope_type(), None);
    }

    #[test]
    fn duplicate_contexts_kept_once() {
        let config = TaggableConfig::new().contexts(["skills", "skills", "languages"]);
        assert_eq!(config.context_names(), &["skills", "languages"]);
    }

    #[test]
    fn unregistered_type_is_not_taggable() {
        let registry = TaggableRegistry::new();
        assert!(!registry.is_taggable("User"));
        assert!(registry.contexts("User").is_empty());
        assert!(registry.config("User").is_none());
    }

    #[test]
    fn register_then_lookup() {
        let registry = TaggableRegistry::new();
        registry.register(
            "User",
            TaggableConfig::new()
                .contexts(["languages", "skills"])
                .scoped_by("Community"),
        );

        assert!(registry.is_taggable("User"));
        assert_eq!(registry.contexts("User"), vec!["languages", "skills"]);
        assert_eq!(
            registry.config("User").unwrap().scope_type(),
            Some("Community")
        );
    }

    #[test]
    fn re_registering_merges_contexts_and_replaces_scope() {
        let registry = TaggableRegistry::new();
        registry.register(
            "User",
            TaggableConfig::new().contexts(["languages", "skills"]).scoped_by("Community"),
        );
        registry.register("User", TaggableConfig::new().contexts(["skills", "needs"]));

        let config = registry.config("User").unwrap();
        assert_eq!(config.context_names(), &["languages", "skills", "needs"]);
        assert_eq!(config.scope_type(), None);
    }

    #[test]
    fn registrations_do_not_leak_between_types() {
        let registry = TaggableRegistry::new();
        registry.register("User", TaggableConfig::new().context("skills"));
        registry.register("Book", TaggableConfig::tags());

        assert!(registry.ensure_context("User", "skills").is_ok());
        assert!(registry.ensure_context("Book", "skills").is_err());
    }

    #[test]
    fn ensure_context_reports_type_and_context() {
        let registry = TaggableRegistry::new();
        registry.register("User", TaggableConfig::tags());

        let err = registry.ensure_context("User", "skills").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Context 'skills' is not registered for taggable type 'User'"
        );
    }

    #[test]
    fn ensure_scope_accepts_matching_kind() {
        let registry = TaggableRegistry::new();
        registry.register("User", TaggableConfig::tags().scoped_by("Community"));
        registry.register("Book", TaggableConfig::tags());

        assert!(registry.ensure_scope("User", Some(&Scope::new("Community", 3))).is_ok());
        assert!(registry.ensure_scope("Book", None).is_ok());
    }

    #[test]
    fn ensure_scope_rejects_mismatches() {
        let registry = TaggableRegistry::new();
        registry.register("User", TaggableConfig::tags().scoped_by("Community"));
        registry.register("Book", TaggableConfig::tags());

        let wrong_kind = registry
            .ensure_scope("User", Some(&Scope::new("Team", 9)))
            .unwrap_err();
        assert!(wrong_kind.is_validation());
        assert_eq!(
            wrong_kind.to_string(),
            "Invalid tag: taggable type 'User' expects a Community scope, got scope Team#9"
        );

        assert!(registry.ensure_scope("User", None).unwrap_err().is_validation());
        assert!(
            registry
                .ensure_scope("Book", Some(&Scope::new("Community", 1)))
                .unwrap_err()
                .is_validation()
        );
    }

    #[test]
    fn global_registry_is_shared() {
        TaggableRegistry::global().register("RegistryTestGlobal", TaggableConfig::tags());
        assert!(TaggableRegistry::global().is_taggable("RegistryTestGlobal"));
    }
}
