//! Global constants used throughout the keylock codebase.
//!
//! This module contains the retry parameters that govern lock acquisition.
//! Defining them centrally improves maintainability and makes the magic
//! numbers more discoverable.

use std::time::Duration;

/// Maximum number of acquisition attempts before giving up (3).
///
/// Three attempts with linearly increasing waits gives a predictable
/// worst-case latency of roughly 600ms at the default base delay, which
/// is short enough to surface contention quickly rather than queueing
/// callers indefinitely.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base wait between acquisition attempts in milliseconds (100ms).
///
/// Attempt `i` waits `base × i`, so the defaults produce waits of
/// 100ms, 200ms, and 300ms. Linear rather than exponential backoff keeps
/// the worst-case total wait bounded and easy to reason about.
pub const DEFAULT_BASE_DELAY_MS: u64 = 100;

/// Default base retry delay as a [`Duration`].
pub fn default_base_delay() -> Duration {
    Duration::from_millis(DEFAULT_BASE_DELAY_MS)
}
