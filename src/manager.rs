//! Keyed lock manager serializing concurrent operations on shared resources.
//!
//! The manager owns a table mapping resource keys to the identity of the
//! call chain currently holding them. Acquisition retries with linearly
//! increasing waits and a bounded attempt count; release only removes an
//! entry its caller actually owns. The scoped [`run_exclusive`] form
//! guarantees release on every exit path, including panics and dropped
//! futures.
//!
//! # Atomicity
//!
//! Acquisition is a single check-then-insert step on the table's entry
//! API, which holds the shard lock across both halves. Two call chains
//! can never both observe a key as free and both insert.
//!
//! [`run_exclusive`]: LockManager::run_exclusive

use crate::constants::{DEFAULT_MAX_RETRIES, default_base_delay};
use crate::context::{CallContext, CallerId};
use crate::error::LockError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Tunables for lock acquisition.
///
/// The defaults (3 attempts, 100ms base delay) give contended callers
/// waits of 100ms, 200ms, and 300ms before failure, roughly 600ms of
/// total wait in the worst case.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Maximum number of acquisition attempts. Values below 1 are
    /// treated as 1: at least one attempt is always made.
    pub max_retries: u32,
    /// Base wait between attempts; attempt `i` waits `base_delay × i`.
    pub base_delay: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: default_base_delay(),
        }
    }
}

/// In-process keyed lock manager.
///
/// Serializes operations that share a logical resource (a document, a
/// workspace) identified by a caller-chosen string key. Callers are
/// identified by the [`CallContext`] they present; the same chain may
/// re-acquire a key it already holds without waiting.
///
/// The manager is an explicit handle, not a global. Construct one and
/// share it (typically behind an `Arc`) with everything that needs to
/// coordinate on the same keys — two managers know nothing about each
/// other's tables.
///
/// No fairness is promised among waiters: a chain that started waiting
/// later may win the key if an earlier waiter is still in its backoff
/// sleep when the key frees up.
///
/// # Example
///
/// ```rust,no_run
/// use keylock::{CallContext, LockManager};
///
/// # async fn example() -> anyhow::Result<()> {
/// let manager = LockManager::new();
/// let ctx = CallContext::new();
///
/// let updated = manager
///     .run_exclusive(&ctx, "doc-1", || async {
///         // Mutate the document knowing no other chain is doing so.
///         Ok(42)
///     })
///     .await?;
/// assert_eq!(updated, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct LockManager {
    /// Resource key → holder. A key is present iff some chain holds it.
    table: Arc<DashMap<String, CallerId>>,
    config: LockConfig,
}

impl LockManager {
    /// Create a manager with the default retry configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with explicit retry tunables.
    #[must_use]
    pub fn with_config(config: LockConfig) -> Self {
        Self {
            table: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Attempt to claim `key` for the caller's chain without waiting.
    ///
    /// Succeeds if the key is free or already held by this chain
    /// (re-entrant). Returns `false` immediately if another chain holds
    /// it; no retry, no sleep. Most callers want [`acquire`] or
    /// [`run_exclusive`] instead.
    ///
    /// [`acquire`]: Self::acquire
    /// [`run_exclusive`]: Self::run_exclusive
    pub fn try_acquire(&self, ctx: &CallContext, key: &str) -> bool {
        let id = ctx.caller_id();
        // Entry holds the shard lock across check and insert, so the
        // claim is atomic even under parallel callers.
        match self.table.entry(key.to_string()) {
            Entry::Occupied(held) => *held.get() == id,
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    /// Claim `key` for the caller's chain, retrying on contention.
    ///
    /// Attempt `i` (1-based) sleeps `base_delay × i` after failing, up
    /// to `max_retries` attempts. With the defaults that is attempts at
    /// t=0, 100ms, and 300ms, returning `false` at roughly 600ms if the
    /// holder never releases.
    ///
    /// Returns `true` on success. Failure is a plain `false` — logged
    /// with the key and retry count, never an error or a panic. The
    /// caller decides whether exhausted retries are fatal.
    pub async fn acquire(&self, ctx: &CallContext, key: &str) -> bool {
        let attempts = self.config.max_retries.max(1);
        for attempt in 1..=attempts {
            if self.try_acquire(ctx, key) {
                debug!("acquired lock '{key}' on attempt {attempt}");
                return true;
            }
            let wait = self.config.base_delay * attempt;
            warn!("lock '{key}' is held by another caller, retrying in {}ms", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
        error!("failed to acquire lock '{key}' after {attempts} attempts");
        false
    }

    /// Release `key` if the caller's chain holds it.
    ///
    /// A no-op if the key is free or held by a different chain, so a
    /// cleanup path can release unconditionally without risking a
    /// double-release error or stealing someone else's lock.
    pub fn release(&self, ctx: &CallContext, key: &str) {
        let id = ctx.caller_id();
        if self.table.remove_if(key, |_, holder| *holder == id).is_some() {
            debug!("released lock '{key}'");
        }
    }

    /// Run `section` while holding `key`, releasing on every exit path.
    ///
    /// If acquisition fails after the bounded retries, returns
    /// [`LockError::Busy`] and never invokes the section. Otherwise the
    /// section runs and its outcome is propagated: its value on success,
    /// its error as [`LockError::Section`] on failure. The lock is
    /// released before returning in both cases, and also if the section
    /// panics or the future is dropped mid-flight.
    pub async fn run_exclusive<R, F, Fut>(
        &self,
        ctx: &CallContext,
        key: &str,
        section: F,
    ) -> Result<R, LockError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<R>>,
    {
        if !self.acquire(ctx, key).await {
            return Err(LockError::Busy {
                key: key.to_string(),
                attempts: self.config.max_retries.max(1),
            });
        }

        // Drop-based release: runs on normal return, section error,
        // unwind, and cancellation of this future alike.
        let _guard = ReleaseGuard {
            table: Arc::clone(&self.table),
            key: key.to_string(),
            holder: ctx.caller_id(),
        };

        section().await.map_err(LockError::Section)
    }

    /// The holder of `key`, if any.
    #[cfg(test)]
    fn holder(&self, key: &str) -> Option<CallerId> {
        self.table.get(key).map(|entry| *entry.value())
    }

    /// Number of keys currently held.
    #[cfg(test)]
    fn held_key_count(&self) -> usize {
        self.table.len()
    }
}

/// Releases the guarded key when dropped, holder-checked like
/// [`LockManager::release`].
struct ReleaseGuard {
    table: Arc<DashMap<String, CallerId>>,
    key: String,
    holder: CallerId,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.table.remove_if(&self.key, |_, holder| *holder == self.holder);
    }
}
