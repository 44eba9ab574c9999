#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod eventually;
/// Shared payload fixtures for blob-store suites.
pub mod fixtures;
mod pool;

pub use eventually::{ConsistencyModel, RetryConfig, assert_eventually};
pub use pool::{ContainerPool, PoolConfig};
