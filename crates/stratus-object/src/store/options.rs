//! Retrieval and listing options.

use jiff::Timestamp;

use crate::types::ContentHash;

/// Conditional predicates and byte-range selection for a get.
///
/// Mirrors the `If-Match` / `If-None-Match` / `If-Modified-Since` /
/// `If-Unmodified-Since` and `Range` headers of a network-backed store.
/// Built in the usual chained style:
///
/// ```
/// use stratus_object::GetOptions;
///
/// let options = GetOptions::new().start_at(5);
/// assert_eq!(options.range.as_deref(), Some("5-"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Succeed only when the stored hash equals this one.
    pub if_match: Option<ContentHash>,
    /// Succeed only when the stored hash differs from this one.
    pub if_none_match: Option<ContentHash>,
    /// Succeed only when the blob was modified at or after this instant.
    pub if_modified_since: Option<Timestamp>,
    /// Succeed only when the blob was not modified after this instant.
    pub if_unmodified_since: Option<Timestamp>,
    /// Comma-separated byte-range specifiers (`0-5`, `5-`, `-5`).
    pub range: Option<String>,
}

impl GetOptions {
    /// Options with no predicates; always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the stored hash to equal `hash`.
    pub fn if_match(mut self, hash: ContentHash) -> Self {
        self.if_match = Some(hash);
        self
    }

    /// Require the stored hash to differ from `hash`.
    pub fn if_none_match(mut self, hash: ContentHash) -> Self {
        self.if_none_match = Some(hash);
        self
    }

    /// Require the blob to have been modified at or after `when`.
    pub fn if_modified_since(mut self, when: Timestamp) -> Self {
        self.if_modified_since = Some(when);
        self
    }

    /// Require the blob to not have been modified after `when`.
    pub fn if_unmodified_since(mut self, when: Timestamp) -> Self {
        self.if_unmodified_since = Some(when);
        self
    }

    /// Raw range specifier list, e.g. `"0-5,10-15"`.
    pub fn range(mut self, spec: impl Into<String>) -> Self {
        self.range = Some(spec.into());
        self
    }

    /// Select the inclusive byte range `start..=end`.
    pub fn byte_range(self, start: u64, end: u64) -> Self {
        self.range(format!("{start}-{end}"))
    }

    /// Select everything from `start` to the end of the object.
    pub fn start_at(self, start: u64) -> Self {
        self.range(format!("{start}-"))
    }

    /// Select the last `length` bytes of the object.
    pub fn tail(self, length: u64) -> Self {
        self.range(format!("-{length}"))
    }

    /// Whether any conditional predicate is set.
    pub fn is_conditional(&self) -> bool {
        self.if_match.is_some()
            || self.if_none_match.is_some()
            || self.if_modified_since.is_some()
            || self.if_unmodified_since.is_some()
    }
}

/// Listing constraints for
/// [`BlobStore::list_blobs`](crate::store::BlobStore::list_blobs).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Only keys starting with this prefix.
    pub prefix: Option<String>,
    /// Roll up keys containing this delimiter past the prefix; entries
    /// deeper than one delimiter level are dropped from the listing.
    pub delimiter: Option<String>,
    /// Return at most this many entries (first slice, key order).
    pub max_results: Option<usize>,
}

impl ListOptions {
    /// Unconstrained listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keys starting with `prefix`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Roll up keys at `delimiter`.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Cap the number of returned entries.
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_helpers_render_specifiers() {
        assert_eq!(GetOptions::new().byte_range(0, 5).range.as_deref(), Some("0-5"));
        assert_eq!(GetOptions::new().start_at(5).range.as_deref(), Some("5-"));
        assert_eq!(GetOptions::new().tail(5).range.as_deref(), Some("-5"));
    }

    #[test]
    fn conditional_detection() {
        assert!(!GetOptions::new().is_conditional());
        assert!(!GetOptions::new().tail(1).is_conditional());
        let hash = ContentHash::compute(b"x");
        assert!(GetOptions::new().if_match(hash).is_conditional());
        assert!(GetOptions::new().if_none_match(hash).is_conditional());
    }
}
