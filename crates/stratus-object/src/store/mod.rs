//! Store façade and the in-memory emulator.
//!
//! [`BlobStore`] is the public contract; every consumer (including the
//! integration-test harness) goes through it, never through raw registry
//! state, so network-backed implementations can be substituted behind the
//! same interface.

mod conditions;
mod memory;
mod options;
mod range;

pub use memory::MemoryBlobStore;
pub use options::{GetOptions, ListOptions};

use async_trait::async_trait;

use crate::types::{BlobMetadata, BlobRecord, ContainerSummary, ContentHash, Result};

/// Container and blob operations of an object-storage service.
///
/// All operations are async for API compatibility with network-backed
/// stores; the in-memory emulator resolves them immediately. Every
/// mutating operation is visible to reads issued after it returns.
/// Implementations must be safe to invoke concurrently from many tasks;
/// no cross-container ordering guarantee is provided.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Create a container. Idempotent; returns whether the container now
    /// exists (always `true` for the emulator).
    async fn create_container(&self, name: &str) -> Result<bool>;

    /// Whether a container named `name` exists.
    async fn container_exists(&self, name: &str) -> Result<bool>;

    /// Remove the container and all its blobs. Not an error when the
    /// container is already absent, and non-empty containers are removed
    /// permissively.
    async fn delete_container(&self, name: &str) -> Result<()>;

    /// Remove every blob from the container, keeping the container
    /// itself. Fails with `ContainerNotFound` when it does not exist.
    async fn clear_container(&self, name: &str) -> Result<()>;

    /// All containers, ordered by name.
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>>;

    /// Blob metadata in `container` matching `options`, ordered by key.
    /// Fails with `ContainerNotFound` when the container does not exist.
    async fn list_blobs(&self, container: &str, options: ListOptions)
    -> Result<Vec<BlobMetadata>>;

    /// Store a copy of `record` under its key, overwriting any existing
    /// blob. The content hash is recomputed from the payload, the
    /// last-modified stamp is set to now, and user-metadata keys are
    /// lowercased. Fails with `ContainerNotFound` when the container does
    /// not exist (no create-on-write).
    async fn put_blob(&self, container: &str, record: BlobRecord) -> Result<ContentHash>;

    /// Retrieve an independent copy of the blob at `key`.
    async fn get_blob(&self, container: &str, key: &str) -> Result<BlobRecord>;

    /// Retrieve a blob subject to conditional predicates and/or a byte
    /// range. Conditions are evaluated before range extraction; a ranged
    /// response trims the body while `metadata.size` keeps the original
    /// length.
    async fn get_blob_opts(
        &self,
        container: &str,
        key: &str,
        options: GetOptions,
    ) -> Result<BlobRecord>;

    /// Whether a blob exists at `key`. Fails with `ContainerNotFound`
    /// when the container does not exist.
    async fn blob_exists(&self, container: &str, key: &str) -> Result<bool>;

    /// Metadata of the blob at `key`, surfacing the same not-found
    /// faults as [`get_blob`](Self::get_blob).
    async fn blob_metadata(&self, container: &str, key: &str) -> Result<BlobMetadata>;

    /// Remove the blob at `key`. A no-op when the container or key does
    /// not exist.
    async fn remove_blob(&self, container: &str, key: &str) -> Result<()>;

    /// Copy a blob to a new container/key, re-stamping its last-modified
    /// time. Content bytes, content-type, and user metadata carry over.
    async fn copy_blob(
        &self,
        from_container: &str,
        from_key: &str,
        to_container: &str,
        to_key: &str,
    ) -> Result<ContentHash>;
}
