//! Error types for lock operations.
//!
//! The error surface is deliberately small: scoped execution can fail
//! either because the lock was never acquired or because the guarded
//! operation itself failed. The two are distinct variants so callers can
//! retry contention at a higher level without masking real failures.

use thiserror::Error;

/// Errors returned by [`LockManager::run_exclusive`](crate::LockManager::run_exclusive).
#[derive(Debug, Error)]
pub enum LockError {
    /// All acquisition attempts were exhausted while another call chain
    /// held the lock. The guarded operation was never invoked.
    #[error("failed to acquire lock '{key}' after {attempts} attempts")]
    Busy {
        /// The contended resource key.
        key: String,
        /// Number of acquisition attempts made before giving up.
        attempts: u32,
    },

    /// The guarded operation failed. The lock was released before this
    /// error was returned; the underlying error is propagated verbatim.
    #[error("guarded operation failed: {0}")]
    Section(#[from] anyhow::Error),
}

impl LockError {
    /// Check whether this is a contention failure that a caller may
    /// choose to retry.
    pub fn is_busy(&self) -> bool {
        matches!(self, LockError::Busy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_is_distinguishable_from_section_failure() {
        let busy = LockError::Busy {
            key: "doc-1".to_string(),
            attempts: 3,
        };
        let section = LockError::from(anyhow::anyhow!("boom"));

        assert!(busy.is_busy());
        assert!(!section.is_busy());
    }

    #[test]
    fn busy_message_names_key_and_attempts() {
        let busy = LockError::Busy {
            key: "workspace-7".to_string(),
            attempts: 3,
        };
        let msg = busy.to_string();
        assert!(msg.contains("workspace-7"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn section_error_is_propagated_verbatim() {
        let section = LockError::from(anyhow::anyhow!("disk full"));
        assert!(section.to_string().contains("disk full"));
    }
}
