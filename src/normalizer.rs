use std::collections::HashSet;

use crate::error::{Result, TagError};

/// Comparison policy for tag names.
///
/// Two names are the same tag iff their normalized forms are byte-equal.
/// The normalized form is also what the store writes to `name_key`, which
/// carries the unique index, so lookups and the constraint never disagree.
pub struct TagNormalizer;

impl TagNormalizer {
    /// Normalizes a tag name for comparison.
    ///
    /// # Normalization rules
    ///
    /// - Trims leading/trailing whitespace
    /// - Case-folds: full Unicode uppercase, then per-character lowercase
    ///   (locale-insensitive, no final-sigma context rule)
    ///
    /// Folding through uppercase makes `normalize(s) == normalize(&s.to_uppercase())`
    /// hold for multi-character mappings such as `ß`/`SS` and for word-final sigma.
    ///
    /// Total over any input; the empty string is a valid normalized form.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagspace::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::normalize("  Awesome "), "awesome");
    /// assert_eq!(TagNormalizer::normalize("Cool Tool"), "cool tool");
    /// assert_eq!(TagNormalizer::normalize("   "), "");
    /// assert_eq!(TagNormalizer::normalize("Straße"), TagNormalizer::normalize("STRASSE"));
    /// ```
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        raw.trim()
            .to_uppercase()
            .chars()
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Strips whitespace but keeps the caller's casing; this is the form stored as `name`.
    #[must_use]
    pub fn strip(raw: &str) -> &str {
        raw.trim()
    }

    /// Returns the stripped display name, or a validation error when blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagspace::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::validate(" Epic ").unwrap(), "Epic");
    /// assert!(TagNormalizer::validate(" \t ").is_err());
    /// ```
    pub fn validate(raw: &str) -> Result<&str> {
        let stripped = Self::strip(raw);
        if stripped.is_empty() {
            return Err(TagError::Validation(format!(
                "tag name cannot be blank (got {raw:?})"
            )));
        }
        Ok(stripped)
    }

    /// Returns true when both names normalize to the same key.
    #[must_use]
    pub fn same(a: &str, b: &str) -> bool {
        Self::normalize(a) == Self::normalize(b)
    }

    /// Validates a batch and collapses it to distinct names.
    ///
    /// Returns `(normalized, stripped)` pairs in order of first occurrence.
    /// Fails on the first blank name without returning a partial result.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagspace::TagNormalizer;
    ///
    /// let names = ["Rust", " rust ", "AI"];
    /// let distinct = TagNormalizer::distinct(&names).unwrap();
    /// assert_eq!(
    ///     distinct,
    ///     vec![
    ///         ("rust".to_string(), "Rust".to_string()),
    ///         ("ai".to_string(), "AI".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn distinct<S: AsRef<str>>(names: &[S]) -> Result<Vec<(String, String)>> {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();

        for name in names {
            let stripped = Self::validate(name.as_ref())?;
            let key = Self::normalize(stripped);
            if seen.insert(key.clone()) {
                distinct.push((key, stripped.to_string()));
            }
        }

        Ok(distinct)
    }
}
