//! keylock - in-process keyed mutual exclusion for async Rust
//!
//! A small lock manager that serializes concurrent operations sharing a
//! logical resource (a document, a workspace) identified by a
//! caller-chosen string key. Callers are identified per logical call
//! chain, acquisition retries with bounded linear backoff, and the scoped
//! form guarantees release on every exit path.
//!
//! # Model
//!
//! - A [`CallContext`] represents one logical unit of work (e.g. one
//!   incoming request) and everything it spawns. Clones share one
//!   identity; fresh contexts never collide.
//! - A [`LockManager`] owns the key → holder table. It is an explicit,
//!   injectable handle — construct one and share it via `Arc`; there is
//!   no hidden global.
//! - Acquisition on a contended key retries up to `max_retries` times,
//!   attempt `i` waiting `base_delay × i` (100/200/300ms by default).
//!   Exhaustion is a plain failure, not a panic.
//! - Re-entry is free: a chain re-acquiring a key it holds succeeds
//!   immediately.
//!
//! # Modules
//!
//! - [`constants`] - default retry count and base delay
//! - [`context`] - [`CallContext`] and [`CallerId`] identity resolution
//! - [`error`] - [`LockError`] taxonomy
//! - [`manager`] - [`LockManager`], [`LockConfig`], and the lock table
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keylock::{CallContext, LockManager};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let manager = Arc::new(LockManager::new());
//!
//! // One context per incoming request; clones share its identity.
//! let ctx = CallContext::new();
//!
//! let result = manager
//!     .run_exclusive(&ctx, "workspace-7", || async {
//!         // No other call chain is touching workspace-7 here.
//!         Ok("updated")
//!     })
//!     .await?;
//! assert_eq!(result, "updated");
//! # Ok(())
//! # }
//! ```
//!
//! Contention and guarded-operation failures are distinguishable:
//!
//! ```rust,no_run
//! use keylock::{CallContext, LockError, LockManager};
//!
//! # async fn example(manager: &LockManager, ctx: &CallContext) {
//! match manager.run_exclusive(ctx, "doc-1", || async { Ok(()) }).await {
//!     Ok(()) => {}
//!     Err(err) if err.is_busy() => { /* back off, retry later */ }
//!     Err(err) => { /* the guarded operation itself failed */ }
//! }
//! # }
//! ```
//!
//! # What this is not
//!
//! Lock state lives in process memory only: nothing is persisted, and
//! two processes see independent tables. A distributed variant needs
//! lease expiry and a shared table; this crate deliberately stops at the
//! in-process primitive.

pub mod constants;
pub mod context;
pub mod error;
pub mod manager;

pub use context::{CallContext, CallerId};
pub use error::LockError;
pub use manager::{LockConfig, LockManager};
