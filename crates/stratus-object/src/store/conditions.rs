//! Conditional-retrieval evaluation.
//!
//! Applies the `If-Match` / `If-None-Match` / `If-Modified-Since` /
//! `If-Unmodified-Since` predicates against stored metadata before a blob
//! is returned. Predicates are evaluated in that fixed order and the
//! first failing one wins; callers normally set only one family per
//! request, but nothing enforces that.

use crate::types::{BlobMetadata, Error, Result};
use crate::store::GetOptions;

/// Evaluate the conditional predicates in `options` against `metadata`.
///
/// Returns `Ok(())` when no predicate is set or all of them hold.
/// Failures map onto the HTTP status a network-backed store would send:
/// `PreconditionFailed` (412) for the strong predicates, `NotModified`
/// (304) when the caller's cached copy is still valid.
pub fn evaluate(metadata: &BlobMetadata, options: &GetOptions) -> Result<()> {
    if let Some(expected) = options.if_match {
        if metadata.content_hash != expected {
            return Err(Error::precondition_failed()
                .with_message(format!("if-match {expected} != {}", metadata.content_hash)));
        }
    }
    if let Some(unexpected) = options.if_none_match {
        if metadata.content_hash == unexpected {
            return Err(Error::not_modified()
                .with_message(format!("if-none-match {unexpected} matches stored hash")));
        }
    }
    if let Some(modified_since) = options.if_modified_since {
        if metadata.last_modified < modified_since {
            return Err(Error::not_modified().with_message(format!(
                "{} is before {modified_since}",
                metadata.last_modified
            )));
        }
    }
    if let Some(unmodified_since) = options.if_unmodified_since {
        if metadata.last_modified > unmodified_since {
            return Err(Error::precondition_failed().with_message(format!(
                "{} is after {unmodified_since}",
                metadata.last_modified
            )));
        }
    }
    Ok(())
}
