//! Bounded-retry tolerance for eventually-consistent stores.
//!
//! A write against a real object store may not be visible to an
//! immediately-following read. Assertions in the integration suite are
//! therefore wrapped in [`assert_eventually`], which retries a check for
//! up to the configured inconsistency window. The in-memory emulator is
//! strictly consistent, so under [`ConsistencyModel::Strict`] the check
//! runs exactly once.

use std::time::Duration;

/// Consistency model of the store under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsistencyModel {
    /// Writes are visible immediately; checks are not retried.
    #[default]
    Strict,
    /// Writes may lag reads; checks are retried across the window.
    Eventual,
}

/// Retry schedule for [`assert_eventually`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of times the check is run.
    pub attempts: u32,
    /// Total window the store is allowed to be inconsistent for; the
    /// inter-attempt delay is `inconsistency_window / attempts`.
    pub inconsistency_window: Duration,
}

impl RetryConfig {
    /// Create a schedule of `attempts` checks spread over `window`.
    pub fn new(attempts: u32, inconsistency_window: Duration) -> Self {
        Self {
            attempts,
            inconsistency_window,
        }
    }

    fn delay(&self) -> Duration {
        self.inconsistency_window / self.attempts.max(1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            inconsistency_window: Duration::from_secs(5),
        }
    }
}

/// Run `check` until it succeeds, tolerating eventual consistency.
///
/// Under [`ConsistencyModel::Strict`] the check runs once and its result
/// is returned directly. Under [`ConsistencyModel::Eventual`] the check
/// is retried up to `config.attempts` times with a fixed inter-attempt
/// delay; when every attempt fails the last observed error is returned,
/// so the caller sees the original assertion failure rather than a
/// timeout.
pub async fn assert_eventually<F, Fut, E>(
    model: ConsistencyModel,
    config: RetryConfig,
    mut check: F,
) -> Result<(), E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    if model == ConsistencyModel::Strict {
        return check().await;
    }

    let attempts = config.attempts.max(1);
    let delay = config.delay();
    let mut last_err = match check().await {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    for _ in 1..attempts {
        tokio::time::sleep(delay).await;
        match check().await {
            Ok(()) => return Ok(()),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}
