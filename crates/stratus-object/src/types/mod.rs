//! Value types shared across the crate.

mod blob;
mod container;
mod error;

pub use blob::{BlobMetadata, BlobRecord, ContentHash};
pub use container::ContainerSummary;
pub use error::{BoxedError, Error, ErrorKind, Result};
