#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Store façade trait, retrieval options, and the in-memory emulator.
pub mod store;
/// Inlined types (Error, BlobRecord, BlobMetadata, ContainerSummary).
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use store::{BlobStore, GetOptions, ListOptions, MemoryBlobStore};
pub use types::{BlobMetadata, BlobRecord, ContainerSummary, ContentHash, Error, ErrorKind, Result};
