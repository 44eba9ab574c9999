//! Concurrency-safe pool of test containers.
//!
//! Parallel test tasks borrow pre-created container names instead of
//! creating one per test, which keeps suites fast against real stores
//! (container creation is slow and often quota-limited) and bounds how
//! many containers a run can leak. Names flow through a bounded channel:
//! borrowed by [`ContainerPool::acquire`], given back by
//! [`ContainerPool::release`], and occasionally replaced under a
//! disambiguated name by [`ContainerPool::recycle`].

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;

use stratus_object::{BlobStore, Error, Result};

/// Logging target for pool operations.
const POOL_TARGET: &str = "stratus_test::pool";

/// Container pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of containers created at suite start.
    pub capacity: usize,
    /// Container names are `{prefix}{index}`.
    pub prefix: String,
    /// How long [`ContainerPool::acquire`] waits before failing with
    /// `ResourceExhausted`.
    pub acquire_timeout: Duration,
    /// Verify on release that the name still resolves to an existing
    /// container. Catches tests that return a name they deleted, but is
    /// expensive against network-backed stores, so off by default.
    pub sanity_check_on_return: bool,
}

impl PoolConfig {
    /// Configuration with the given capacity and defaults elsewhere.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Set the container-name prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the acquisition timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Enable the existence check on release.
    pub fn sanity_check_on_return(mut self, enabled: bool) -> Self {
        self.sanity_check_on_return = enabled;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            prefix: "test-blobstore".to_owned(),
            acquire_timeout: Duration::from_secs(30),
            sanity_check_on_return: false,
        }
    }
}

/// Pool of pre-created, empty containers shared across parallel tasks.
pub struct ContainerPool {
    store: Arc<dyn BlobStore>,
    config: PoolConfig,
    tx: mpsc::Sender<String>,
    rx: Mutex<mpsc::Receiver<String>>,
    next_index: AtomicU32,
    /// Containers that could not be deleted; never handed out again so
    /// one permanently-broken container does not fail unrelated tests.
    blacklist: Arc<Mutex<HashSet<String>>>,
    /// Every name the pool currently considers its own, for teardown.
    live: Mutex<HashSet<String>>,
}

impl ContainerPool {
    /// Create `config.capacity` empty containers and fill the pool.
    ///
    /// A container that fails to create is skipped with a warning and the
    /// index advances to the next name; initialization fails with
    /// `ResourceExhausted` when the store rejects too many in a row.
    pub async fn initialize(store: Arc<dyn BlobStore>, config: PoolConfig) -> Result<Self> {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let pool = Self {
            store,
            config,
            tx,
            rx: Mutex::new(rx),
            next_index: AtomicU32::new(0),
            blacklist: Arc::new(Mutex::new(HashSet::new())),
            live: Mutex::new(HashSet::new()),
        };

        let mut created = 0;
        let mut tries = 0;
        let budget = pool.config.capacity * 3;
        while created < pool.config.capacity {
            if tries >= budget.max(1) {
                return Err(Error::resource_exhausted().with_message(format!(
                    "created only {created} of {} pool containers after {tries} attempts",
                    pool.config.capacity
                )));
            }
            tries += 1;

            let index = pool.next_index.fetch_add(1, Ordering::SeqCst);
            let name = format!("{}{index}", pool.config.prefix);
            if pool.blacklist.lock().await.contains(&name) {
                continue;
            }
            match pool.create_and_ensure_empty(&name).await {
                Ok(()) => {
                    pool.live.lock().await.insert(name.clone());
                    pool.tx
                        .send(name)
                        .await
                        .map_err(|_| Error::unknown().with_message("container pool closed"))?;
                    created += 1;
                }
                Err(err) => {
                    // Throw the name away and move on to the next index.
                    tracing::warn!(
                        target: POOL_TARGET,
                        container = %name,
                        error = %err,
                        "unable to prepare pool container, skipping"
                    );
                }
            }
        }
        tracing::debug!(
            target: POOL_TARGET,
            capacity = pool.config.capacity,
            prefix = %pool.config.prefix,
            "container pool initialized"
        );
        Ok(pool)
    }

    /// Borrow a container name, blocking up to the configured timeout.
    ///
    /// The container is guaranteed to exist and be empty when handed out;
    /// residue left by a prior borrower is cleared here rather than on
    /// release.
    pub async fn acquire(&self) -> Result<String> {
        let receive = async {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        };
        let name = timeout(self.config.acquire_timeout, receive)
            .await
            .map_err(|_| {
                Error::resource_exhausted().with_message(format!(
                    "no container became available within {:?}",
                    self.config.acquire_timeout
                ))
            })?
            .ok_or_else(|| Error::resource_exhausted().with_message("container pool closed"))?;

        self.create_and_ensure_empty(&name).await?;
        tracing::trace!(target: POOL_TARGET, container = %name, "container acquired");
        Ok(name)
    }

    /// Return a borrowed name to circulation.
    pub async fn release(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.config.sanity_check_on_return && !self.store.container_exists(&name).await? {
            return Err(Error::unknown().with_message(format!(
                "test returned the name of a non-existent container: {name}"
            )));
        }
        tracing::trace!(target: POOL_TARGET, container = %name, "container released");
        self.tx
            .send(name)
            .await
            .map_err(|_| Error::unknown().with_message("container pool closed"))
    }

    /// Replace a borrowed container with a freshly-created one.
    ///
    /// The old container is deleted on a background task so the caller
    /// never waits on it; deletion failures are logged and the name is
    /// blacklisted rather than retried forever. Returns the new name,
    /// `{old}{counter}`, already created and empty.
    pub async fn recycle(&self, name: impl Into<String>) -> Result<String> {
        let old = name.into();
        self.live.lock().await.remove(&old);

        let store = Arc::clone(&self.store);
        let blacklist = Arc::clone(&self.blacklist);
        let doomed = old.clone();
        tokio::spawn(async move {
            if let Err(err) = store.delete_container(&doomed).await {
                tracing::warn!(
                    target: POOL_TARGET,
                    container = %doomed,
                    error = %err,
                    "unable to delete container, blacklisting"
                );
                blacklist.lock().await.insert(doomed);
            }
        });

        let new_name = format!("{old}{}", self.next_index.fetch_add(1, Ordering::SeqCst));
        self.create_and_ensure_empty(&new_name).await?;
        self.live.lock().await.insert(new_name.clone());
        tracing::debug!(
            target: POOL_TARGET,
            old = %old,
            new = %new_name,
            "container recycled"
        );
        Ok(new_name)
    }

    /// Borrow a container no other test has ever seen.
    ///
    /// Acquires a pooled name and immediately recycles it, so the
    /// returned container is brand new while the pool size is preserved.
    pub async fn scratch(&self) -> Result<String> {
        let name = self.acquire().await?;
        self.recycle(name).await
    }

    /// Recycle a borrowed container and return its replacement to the
    /// pool, for tests that dirtied a container beyond cheap cleanup.
    pub async fn recycle_and_release(&self, name: impl Into<String>) -> Result<()> {
        let replacement = self.recycle(name).await?;
        self.release(replacement).await
    }

    /// Best-effort deletion of every container the pool owns.
    pub async fn shutdown(&self) {
        let names: Vec<String> = self.live.lock().await.drain().collect();
        for name in names {
            if let Err(err) = self.store.delete_container(&name).await {
                tracing::warn!(
                    target: POOL_TARGET,
                    container = %name,
                    error = %err,
                    "unable to delete container during shutdown"
                );
            }
        }
    }

    async fn create_and_ensure_empty(&self, name: &str) -> Result<()> {
        self.store.create_container(name).await?;
        self.store.clear_container(name).await
    }
}

impl std::fmt::Debug for ContainerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerPool")
            .field("config", &self.config)
            .finish()
    }
}
