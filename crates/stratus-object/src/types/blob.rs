//! Blob record and metadata value types.
//!
//! A [`BlobRecord`] is a named binary object plus its [`BlobMetadata`].
//! Records are plain values with explicit clone semantics: the store keeps
//! its own copy on put and hands out an independent copy on get, so caller
//! and store never alias a mutable buffer.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use jiff::Timestamp;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::types::Error;

/// 128-bit content digest used as the ETag for conditional requests.
///
/// Always recomputed from the payload on write, never supplied by the
/// caller. Displays as 32 lowercase hex characters; parsing tolerates the
/// surrounding quotes HTTP ETags carry on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Compute the digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches('"');
        let decoded = hex::decode(trimmed).map_err(|e| {
            Error::invalid_argument()
                .with_message(format!("malformed content hash: {trimmed}"))
                .with_source(e)
        })?;
        let bytes: [u8; 16] = decoded.try_into().map_err(|_| {
            Error::invalid_argument().with_message("content hash must be 128 bits")
        })?;
        Ok(Self(bytes))
    }
}

/// Metadata associated with a stored blob.
///
/// `size` always reflects the full object length, even when a range
/// response trims the returned body; callers distinguish "bytes returned"
/// via [`BlobRecord::content_length`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    /// Key, unique within its container.
    pub key: String,
    /// MIME content-type, if one was supplied on put.
    pub content_type: Option<String>,
    /// Full object length in bytes, pre-range.
    pub size: u64,
    /// Digest of the payload; doubles as the ETag.
    pub content_hash: ContentHash,
    /// Stamped by the store at write time.
    pub last_modified: Timestamp,
    /// User-supplied metadata; keys are lowercased on write.
    pub user_metadata: HashMap<String, String>,
}

impl BlobMetadata {
    /// Lowercase all user-metadata keys in place.
    ///
    /// Object stores treat user-metadata header names case-insensitively,
    /// so the emulator normalizes on write.
    pub fn lowercase_user_metadata(&mut self) {
        if self.user_metadata.keys().all(|k| k.chars().all(|c| !c.is_uppercase())) {
            return;
        }
        self.user_metadata = self
            .user_metadata
            .drain()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
    }
}

/// A named binary object with metadata, analogous to a file inside a
/// container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Metadata (key, content-type, size, hash, timestamps).
    pub metadata: BlobMetadata,
    /// Raw payload. Immutable once constructed.
    pub data: Bytes,
}

impl BlobRecord {
    /// Create a record for `key` holding `data`.
    ///
    /// The hash and size are derived from the payload here for
    /// convenience; the store recomputes both on every put.
    pub fn new(key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let metadata = BlobMetadata {
            key: key.into(),
            content_type: None,
            size: data.len() as u64,
            content_hash: ContentHash::compute(&data),
            last_modified: Timestamp::now(),
            user_metadata: HashMap::new(),
        };
        Self { metadata, data }
    }

    /// Set the MIME content-type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.metadata.content_type = Some(content_type.into());
        self
    }

    /// Attach a user-metadata entry.
    pub fn with_user_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.metadata.user_metadata.insert(key.into(), value.into());
        self
    }

    /// Number of bytes in the returned body.
    ///
    /// Equals `metadata.size` except after range fulfillment, where the
    /// body is trimmed but `size` keeps the original total.
    pub fn content_length(&self) -> u64 {
        self.data.len() as u64
    }
}
