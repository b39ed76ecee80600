use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a tag row.
///
/// Wraps the SQLite rowid; stable for the lifetime of the row and usable
/// as a foreign key by an association layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(i64);

impl TagId {
    /// Creates a new tag ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_id_serializes_as_raw_integer() {
        let id = TagId::new(99);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "99");

        let deserialized: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn tag_id_orders_by_rowid() {
        assert!(TagId::new(1) < TagId::new(2));
        assert_eq!(TagId::new(5).to_string(), "5");
    }
}
