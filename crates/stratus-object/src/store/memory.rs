//! In-memory blob store implementation.
//!
//! [`MemoryBlobStore`] keeps all state in a container-name → blob-key map
//! behind a `tokio::sync::RwLock`. It is immediately consistent and has
//! no internal threads; operations execute on the caller's task. Blob
//! payloads are `Bytes` and therefore immutable, so handing out clones
//! preserves the deep-copy ownership boundary of the contract.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::store::{BlobStore, GetOptions, ListOptions, conditions, range};
use crate::types::{BlobMetadata, BlobRecord, ContainerSummary, ContentHash, Error, Result};

/// Logging target for emulator operations.
const MEMORY_TARGET: &str = "stratus_object::store::memory";

/// A flat namespace of blobs. Keys are unique within the container only.
#[derive(Debug, Clone, Default)]
struct Container {
    blobs: HashMap<String, BlobRecord>,
}

/// In-memory, immediately-consistent [`BlobStore`].
///
/// Cloning is cheap and clones share the same registry, mirroring how a
/// network-backed client shares one remote store.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    containers: Arc<RwLock<HashMap<String, Container>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of containers currently registered.
    pub async fn container_count(&self) -> usize {
        self.containers.read().await.len()
    }

    /// Whether `container` exists and holds no blobs.
    pub async fn is_empty(&self, container: &str) -> Result<bool> {
        let containers = self.containers.read().await;
        let container = containers
            .get(container)
            .ok_or_else(|| Error::container_not_found(container))?;
        Ok(container.blobs.is_empty())
    }
}

impl fmt::Debug for MemoryBlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.containers.try_read().map(|c| c.len()).ok();
        f.debug_struct("MemoryBlobStore")
            .field("container_count", &count)
            .finish()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    #[tracing::instrument(name = "store.create_container", skip(self))]
    async fn create_container(&self, name: &str) -> Result<bool> {
        let mut containers = self.containers.write().await;
        if !containers.contains_key(name) {
            containers.insert(name.to_owned(), Container::default());
            tracing::debug!(target: MEMORY_TARGET, container = name, "container created");
        }
        Ok(containers.contains_key(name))
    }

    async fn container_exists(&self, name: &str) -> Result<bool> {
        Ok(self.containers.read().await.contains_key(name))
    }

    #[tracing::instrument(name = "store.delete_container", skip(self))]
    async fn delete_container(&self, name: &str) -> Result<()> {
        let mut containers = self.containers.write().await;
        if containers.remove(name).is_some() {
            tracing::debug!(target: MEMORY_TARGET, container = name, "container deleted");
        }
        Ok(())
    }

    #[tracing::instrument(name = "store.clear_container", skip(self))]
    async fn clear_container(&self, name: &str) -> Result<()> {
        let mut containers = self.containers.write().await;
        let container = containers
            .get_mut(name)
            .ok_or_else(|| Error::container_not_found(name))?;
        container.blobs.clear();
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let containers = self.containers.read().await;
        let mut summaries: Vec<ContainerSummary> = containers
            .iter()
            .map(|(name, container)| ContainerSummary::new(name, container.blobs.len() as u64))
            .collect();
        summaries.sort();
        Ok(summaries)
    }

    #[tracing::instrument(name = "store.list_blobs", skip(self, options))]
    async fn list_blobs(
        &self,
        container: &str,
        options: ListOptions,
    ) -> Result<Vec<BlobMetadata>> {
        let containers = self.containers.read().await;
        let container = containers
            .get(container)
            .ok_or_else(|| Error::container_not_found(container))?;

        let prefix = options.prefix.as_deref().unwrap_or("");
        let mut entries: Vec<BlobMetadata> = container
            .blobs
            .values()
            .filter(|record| record.metadata.key.starts_with(prefix))
            .filter(|record| match options.delimiter.as_deref() {
                // Roll up: drop entries nested past the delimiter.
                Some(delimiter) => !record.metadata.key[prefix.len()..].contains(delimiter),
                None => true,
            })
            .map(|record| record.metadata.clone())
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(max) = options.max_results {
            entries.truncate(max);
        }
        Ok(entries)
    }

    #[tracing::instrument(
        name = "store.put_blob",
        skip(self, record),
        fields(key = %record.metadata.key, size = record.data.len())
    )]
    async fn put_blob(&self, container: &str, mut record: BlobRecord) -> Result<ContentHash> {
        let mut containers = self.containers.write().await;
        let target = containers
            .get_mut(container)
            .ok_or_else(|| Error::container_not_found(container))?;

        record.metadata.size = record.data.len() as u64;
        record.metadata.content_hash = ContentHash::compute(&record.data);
        record.metadata.last_modified = Timestamp::now();
        record.metadata.lowercase_user_metadata();

        let hash = record.metadata.content_hash;
        target.blobs.insert(record.metadata.key.clone(), record);
        Ok(hash)
    }

    #[tracing::instrument(name = "store.get_blob", skip(self))]
    async fn get_blob(&self, container: &str, key: &str) -> Result<BlobRecord> {
        let containers = self.containers.read().await;
        let blobs = &containers
            .get(container)
            .ok_or_else(|| Error::container_not_found(container))?
            .blobs;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| Error::key_not_found(container, key))
    }

    #[tracing::instrument(name = "store.get_blob_opts", skip(self, options))]
    async fn get_blob_opts(
        &self,
        container: &str,
        key: &str,
        options: GetOptions,
    ) -> Result<BlobRecord> {
        let containers = self.containers.read().await;
        let blobs = &containers
            .get(container)
            .ok_or_else(|| Error::container_not_found(container))?
            .blobs;
        let record = blobs
            .get(key)
            .ok_or_else(|| Error::key_not_found(container, key))?;

        conditions::evaluate(&record.metadata, &options)?;

        let mut copy = record.clone();
        if let Some(spec) = options.range.as_deref() {
            // metadata.size keeps the full length; only the body shrinks.
            copy.data = range::apply(spec, &record.data)?;
        }
        Ok(copy)
    }

    async fn blob_exists(&self, container: &str, key: &str) -> Result<bool> {
        let containers = self.containers.read().await;
        let container = containers
            .get(container)
            .ok_or_else(|| Error::container_not_found(container))?;
        Ok(container.blobs.contains_key(key))
    }

    async fn blob_metadata(&self, container: &str, key: &str) -> Result<BlobMetadata> {
        self.get_blob(container, key).await.map(|record| record.metadata)
    }

    #[tracing::instrument(name = "store.remove_blob", skip(self))]
    async fn remove_blob(&self, container: &str, key: &str) -> Result<()> {
        let mut containers = self.containers.write().await;
        if let Some(container) = containers.get_mut(container) {
            container.blobs.remove(key);
        }
        Ok(())
    }

    #[tracing::instrument(name = "store.copy_blob", skip(self))]
    async fn copy_blob(
        &self,
        from_container: &str,
        from_key: &str,
        to_container: &str,
        to_key: &str,
    ) -> Result<ContentHash> {
        let mut containers = self.containers.write().await;
        let mut record = containers
            .get(from_container)
            .ok_or_else(|| Error::container_not_found(from_container))?
            .blobs
            .get(from_key)
            .cloned()
            .ok_or_else(|| Error::key_not_found(from_container, from_key))?;
        let target = containers
            .get_mut(to_container)
            .ok_or_else(|| Error::container_not_found(to_container))?;

        record.metadata.key = to_key.to_owned();
        record.metadata.last_modified = Timestamp::now();
        let hash = record.metadata.content_hash;
        target.blobs.insert(to_key.to_owned(), record);
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::types::ErrorKind;

    const PAYLOAD: &[u8] = b"<apples><apple name=\"apple\"></apple> </apples>";

    async fn store_with_container(name: &str) -> MemoryBlobStore {
        let store = MemoryBlobStore::new();
        store.create_container(name).await.unwrap();
        store
    }

    fn record(key: &str) -> BlobRecord {
        BlobRecord::new(key, Bytes::from_static(PAYLOAD)).with_content_type("text/xml")
    }

    #[tokio::test]
    async fn round_trip_preserves_bytes_and_hash() -> anyhow::Result<()> {
        let store = store_with_container("photos").await;
        let hash = store.put_blob("photos", record("apple.xml")).await?;

        let fetched = store.get_blob("photos", "apple.xml").await?;
        assert_eq!(fetched.data.as_ref(), PAYLOAD);
        assert_eq!(fetched.metadata.content_hash, hash);
        assert_eq!(hash, ContentHash::compute(PAYLOAD));
        Ok(())
    }

    #[tokio::test]
    async fn create_container_is_idempotent() -> anyhow::Result<()> {
        let store = store_with_container("twice").await;
        store.put_blob("twice", record("kept.xml")).await?;

        assert!(store.create_container("twice").await?);
        assert_eq!(store.container_count().await, 1);
        // The blob written after the first create survives the second.
        assert!(store.blob_exists("twice", "kept.xml").await?);
        Ok(())
    }

    #[tokio::test]
    async fn put_into_missing_container_fails() {
        let store = MemoryBlobStore::new();
        let err = store.put_blob("nowhere", record("k")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContainerNotFound);
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        store.put_blob("c", record("k")).await?;
        let hash = store
            .put_blob("c", BlobRecord::new("k", &b"replacement"[..]))
            .await?;

        let fetched = store.get_blob("c", "k").await?;
        assert_eq!(fetched.data.as_ref(), b"replacement");
        assert_eq!(fetched.metadata.content_hash, hash);
        assert_eq!(
            store.list_blobs("c", ListOptions::new()).await?.len(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn put_normalizes_user_metadata_and_stamps_time() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        let before = Timestamp::now();
        store
            .put_blob("c", record("k").with_user_metadata("X-Mixed-Case", "v"))
            .await?;

        let meta = store.blob_metadata("c", "k").await?;
        assert_eq!(
            meta.user_metadata.get("x-mixed-case").map(String::as_str),
            Some("v")
        );
        assert!(meta.last_modified >= before);
        Ok(())
    }

    #[tokio::test]
    async fn store_copy_is_independent_of_caller_buffer() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        let mut caller = record("k");
        store.put_blob("c", caller.clone()).await?;

        // Mutating the caller's record after put must not leak in.
        caller.metadata.user_metadata.insert("late".into(), "edit".into());
        caller.metadata.content_type = Some("application/octet-stream".into());

        let stored = store.get_blob("c", "k").await?;
        assert!(stored.metadata.user_metadata.is_empty());
        assert_eq!(stored.metadata.content_type.as_deref(), Some("text/xml"));

        // And mutating one fetched copy must not affect the next.
        let mut first = store.get_blob("c", "k").await?;
        first.metadata.key = "renamed".into();
        let second = store.get_blob("c", "k").await?;
        assert_eq!(second.metadata.key, "k");
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_blob_or_container_maps_to_404() {
        let store = MemoryBlobStore::new();
        let err = store.get_blob("nope", "k").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContainerNotFound);
        assert_eq!(err.status_code(), 404);

        store.create_container("nope").await.unwrap();
        let err = store.get_blob("nope", "k").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn list_missing_container_fails() {
        let store = MemoryBlobStore::new();
        let err = store
            .list_blobs("ghost", ListOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContainerNotFound);
    }

    #[tokio::test]
    async fn removed_blob_is_gone_and_remove_is_permissive() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        store.put_blob("c", record("a")).await?;
        store.put_blob("c", record("b")).await?;

        store.remove_blob("c", "a").await?;
        let listed = store.list_blobs("c", ListOptions::new()).await?;
        assert_eq!(listed.len(), 1);
        let err = store.get_blob("c", "a").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);

        // Missing key and missing container are both no-ops.
        store.remove_blob("c", "a").await?;
        store.remove_blob("missing", "a").await?;
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_sorted_and_filtered() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        for key in ["five", "four", "one", "path/1", "path/2", "three", "two"] {
            store.put_blob("c", record(key)).await?;
        }

        let all = store.list_blobs("c", ListOptions::new()).await?;
        let keys: Vec<_> = all.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["five", "four", "one", "path/1", "path/2", "three", "two"]);

        let under_path = store
            .list_blobs("c", ListOptions::new().prefix("path/"))
            .await?;
        assert_eq!(under_path.len(), 2);

        // Delimiter rolls up everything below "path/".
        let top_level = store
            .list_blobs("c", ListOptions::new().delimiter("/"))
            .await?;
        let keys: Vec<_> = top_level.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["five", "four", "one", "three", "two"]);

        let first_two = store
            .list_blobs("c", ListOptions::new().max_results(2))
            .await?;
        let keys: Vec<_> = first_two.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["five", "four"]);
        Ok(())
    }

    #[tokio::test]
    async fn list_containers_is_sorted_with_counts() -> anyhow::Result<()> {
        let store = MemoryBlobStore::new();
        for name in ["beta", "alpha"] {
            store.create_container(name).await?;
        }
        store.put_blob("beta", record("only")).await?;

        let summaries = store.list_containers().await?;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "alpha");
        assert_eq!(summaries[0].blob_count, 0);
        assert_eq!(summaries[1].name, "beta");
        assert_eq!(summaries[1].blob_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_container_is_permissive_about_contents() -> anyhow::Result<()> {
        let store = store_with_container("full").await;
        store.put_blob("full", record("k")).await?;

        store.delete_container("full").await?;
        assert!(!store.container_exists("full").await?);
        // Deleting again is not an error.
        store.delete_container("full").await?;
        Ok(())
    }

    #[tokio::test]
    async fn clear_container_keeps_the_container() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        store.put_blob("c", record("k")).await?;

        store.clear_container("c").await?;
        assert!(store.container_exists("c").await?);
        assert!(store.is_empty("c").await?);

        let err = store.clear_container("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContainerNotFound);
        Ok(())
    }

    #[tokio::test]
    async fn conditional_get_applies_before_range() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        let hash = store.put_blob("c", record("k")).await?;

        let options = GetOptions::new().if_match(hash).byte_range(0, 5);
        let ok = store.get_blob_opts("c", "k", options).await?;
        assert_eq!(ok.data.as_ref(), &PAYLOAD[0..6]);

        // A failing predicate wins even when the range is malformed.
        let options = GetOptions::new()
            .if_match(ContentHash::compute(b"other"))
            .range("garbage");
        let err = store.get_blob_opts("c", "k", options).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        Ok(())
    }

    #[tokio::test]
    async fn ranged_get_reports_trimmed_length_and_full_size() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        store.put_blob("c", record("k")).await?;

        let tail = store
            .get_blob_opts("c", "k", GetOptions::new().tail(5))
            .await?;
        assert_eq!(tail.content_length(), 5);
        assert_eq!(tail.metadata.size, 46);
        assert_eq!(tail.data.as_ref(), &PAYLOAD[41..]);

        let from_five = store
            .get_blob_opts("c", "k", GetOptions::new().start_at(5))
            .await?;
        assert_eq!(from_five.data.as_ref(), &PAYLOAD[5..]);
        assert_eq!(from_five.metadata.size, 46);
        Ok(())
    }

    #[tokio::test]
    async fn ranged_get_leaves_stored_blob_untouched() -> anyhow::Result<()> {
        let store = store_with_container("c").await;
        store.put_blob("c", record("k")).await?;

        let _ = store
            .get_blob_opts("c", "k", GetOptions::new().byte_range(0, 5))
            .await?;
        let full = store.get_blob("c", "k").await?;
        assert_eq!(full.content_length(), 46);
        Ok(())
    }

    #[tokio::test]
    async fn copy_blob_carries_bytes_and_restamps() -> anyhow::Result<()> {
        let store = store_with_container("src").await;
        store.create_container("dst").await?;
        let hash = store.put_blob("src", record("orig")).await?;
        let original = store.blob_metadata("src", "orig").await?;

        let copied_hash = store.copy_blob("src", "orig", "dst", "copy").await?;
        assert_eq!(copied_hash, hash);

        let copy = store.get_blob("dst", "copy").await?;
        assert_eq!(copy.data.as_ref(), PAYLOAD);
        assert_eq!(copy.metadata.content_type.as_deref(), Some("text/xml"));
        assert_eq!(copy.metadata.key, "copy");
        assert!(copy.metadata.last_modified >= original.last_modified);

        let err = store.copy_blob("src", "orig", "ghost", "k").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContainerNotFound);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_do_not_corrupt_the_registry() -> anyhow::Result<()> {
        let store = store_with_container("shared").await;
        let mut handles = Vec::new();
        for task in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..16 {
                    let key = format!("task{task}/blob{i}");
                    store
                        .put_blob("shared", BlobRecord::new(key, &b"concurrent"[..]))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await?;
        }

        let listed = store.list_blobs("shared", ListOptions::new()).await?;
        assert_eq!(listed.len(), 8 * 16);
        Ok(())
    }
}
