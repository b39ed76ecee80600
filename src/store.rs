//! Persistent tag storage partitioned by scope.
//!
//! [`TagStore`] is the seam the resolver works against; [`SqliteTagStore`]
//! is the production implementation.

mod search;
mod sqlite;

use crate::error::Result;
use crate::models::{Scope, Tag};

pub use search::TagSearch;
pub use sqlite::SqliteTagStore;

/// Lookup and creation of tag rows.
///
/// Every operation is restricted to the partition selected by `scope`
/// (`None` is the global partition). Names are compared by their
/// [`TagNormalizer`](crate::TagNormalizer) form.
pub trait TagStore {
    /// Returns the tag whose normalized name equals `normalize(name)`.
    fn find_exact(&self, name: &str, scope: Option<&Scope>) -> Result<Option<Tag>>;

    /// Returns every tag matching any of `names` exactly, in one batched query.
    fn find_any(&self, names: &[String], scope: Option<&Scope>) -> Result<Vec<Tag>>;

    /// Lazily yields tags whose normalized name contains `normalize(pattern)`,
    /// in the store's natural row order. The sequence is finite and cannot be
    /// restarted once consumed.
    fn search(
        &self,
        pattern: &str,
        scope: Option<&Scope>,
    ) -> Result<Box<dyn Iterator<Item = Result<Tag>> + '_>>;

    /// Persists a new tag with the stripped `name`.
    ///
    /// # Errors
    ///
    /// - `TagError::Validation` when the name is blank after stripping
    /// - `TagError::Conflict` when the normalized name already exists in the partition
    fn create(&self, name: &str, scope: Option<&Scope>) -> Result<Tag>;
}

impl<T: TagStore + ?Sized> TagStore for &T {
    fn find_exact(&self, name: &str, scope: Option<&Scope>) -> Result<Option<Tag>> {
        (**self).find_exact(name, scope)
    }

    fn find_any(&self, names: &[String], scope: Option<&Scope>) -> Result<Vec<Tag>> {
        (**self).find_any(names, scope)
    }

    fn search(
        &self,
        pattern: &str,
        scope: Option<&Scope>,
    ) -> Result<Box<dyn Iterator<Item = Result<Tag>> + '_>> {
        (**self).search(pattern, scope)
    }

    fn create(&self, name: &str, scope: Option<&Scope>) -> Result<Tag> {
        (**self).create(name, scope)
    }
}
