//! Caller identity for logical call chains.
//!
//! Every acquire/release call is attributed to a *call chain*: one logical
//! unit of work (e.g. one incoming request) and everything it transitively
//! triggers. All work in the same chain must present the same identity so
//! that re-entrant acquisition succeeds, while unrelated chains must never
//! collide.
//!
//! Identity is carried by an explicit [`CallContext`] handle threaded
//! through calls rather than hidden in task-local storage. This keeps the
//! identity flow auditable: a function that needs the lock manager also
//! visibly receives the context it locks under.

use std::fmt;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// Opaque identity of one logical call chain.
///
/// Backed by a random 128-bit UUID, so two independently created
/// identities collide with negligible probability. Never persisted;
/// the identity lives and dies with its call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerId(Uuid);

impl CallerId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-call-chain context resolving to exactly one [`CallerId`].
///
/// Construct one `CallContext` at the entry point of a logical unit of
/// work and pass clones to everything that unit spawns. Clones share the
/// same identity; a freshly constructed context starts a new chain with
/// a distinct identity.
///
/// The identity is generated lazily on first use, so constructing a
/// context that never touches a lock costs nothing beyond an `Arc`.
///
/// # Example
///
/// ```rust
/// use keylock::CallContext;
///
/// let ctx = CallContext::new();
/// let nested = ctx.clone();
/// assert_eq!(ctx.caller_id(), nested.caller_id());
///
/// let unrelated = CallContext::new();
/// assert_ne!(ctx.caller_id(), unrelated.caller_id());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    id: Arc<OnceLock<CallerId>>,
}

impl CallContext {
    /// Create a context for a new call chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity of this call chain, generated on first use.
    ///
    /// Every subsequent call on this context or any clone of it returns
    /// the same identity.
    pub fn caller_id(&self) -> CallerId {
        *self.id.get_or_init(CallerId::generate)
    }
}
