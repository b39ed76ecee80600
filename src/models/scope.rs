use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to the entity that owns a tag namespace.
///
/// A `(type, id)` pair such as `("Community", 42)`. Two scopes are equal iff
/// both the type tag and the id match exactly; the type tag is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    kind: String,
    id: i64,
}

impl Scope {
    /// Creates a scope reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagspace::Scope;
    ///
    /// let scope = Scope::new("Community", 42);
    /// assert_eq!(scope.kind(), "Community");
    /// assert_eq!(scope.id(), 42);
    /// ```
    pub fn new(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    /// Returns the owning entity's type tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the owning entity's id.
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Key of the namespace a lookup or insert is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "partition")]
pub enum PartitionKey {
    /// Unscoped tags.
    Global,
    /// Tags owned by one entity.
    Scoped { kind: String, id: i64 },
}

impl PartitionKey {
    /// Returns true for the unscoped partition.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    /// Column values matching the unique index expressions
    /// `IFNULL(scoped_type, '')` and `IFNULL(scoped_id, 0)`.
    pub(crate) fn index_columns(&self) -> (&str, i64) {
        match self {
            Self::Global => ("", 0),
            Self::Scoped { kind, id } => (kind.as_str(), *id),
        }
    }

    /// Nullable column values as stored in `scoped_type` / `scoped_id`.
    pub(crate) fn stored_columns(&self) -> (Option<&str>, Option<i64>) {
        match self {
            Self::Global => (None, None),
            Self::Scoped { kind, id } => (Some(kind.as_str()), Some(*id)),
        }
    }
}

impl From<Option<&Scope>> for PartitionKey {
    fn from(scope: Option<&Scope>) -> Self {
        partition_key(scope)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Scoped { kind, id } => write!(f, "{kind}#{id}"),
        }
    }
}

/// Maps an optional scope to the partition it selects.
///
/// # Examples
///
/// ```
/// use tagspace::{PartitionKey, Scope, partition_key};
///
/// assert_eq!(partition_key(None), PartitionKey::Global);
/// assert_eq!(
///     partition_key(Some(&Scope::new("Community", 1))).to_string(),
///     "Community#1"
/// );
/// ```
pub fn partition_key(scope: Option<&Scope>) -> PartitionKey {
    match scope {
        None => PartitionKey::Global,
        Some(scope) => PartitionKey::Scoped {
            kind: scope.kind.clone(),
            id: scope.id,
        },
    }
}
