//! Container summary type.

use serde::{Deserialize, Serialize};

/// Summary of a container as reported by
/// [`BlobStore::list_containers`](crate::store::BlobStore::list_containers).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerSummary {
    /// Container name, unique across the registry.
    pub name: String,
    /// Number of blobs currently stored in the container.
    pub blob_count: u64,
}

impl ContainerSummary {
    /// Create a summary for `name` holding `blob_count` blobs.
    pub fn new(name: impl Into<String>, blob_count: u64) -> Self {
        Self {
            name: name.into(),
            blob_count,
        }
    }
}
