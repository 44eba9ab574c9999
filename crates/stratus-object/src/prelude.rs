//! Convenience re-exports for downstream crates.

pub use crate::store::{BlobStore, GetOptions, ListOptions, MemoryBlobStore};
pub use crate::types::{
    BlobMetadata, BlobRecord, ContainerSummary, ContentHash, Error, ErrorKind, Result,
};
