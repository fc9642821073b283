//! Wall-clock helpers for override expiry.
//!
//! Overrides are persisted as absolute epoch milliseconds so they survive a
//! process restart; monotonic time cannot be used for that.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub type EpochMillis = u64;

/// Returns the current unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as zero rather than panicking.
pub fn unix_time_ms_now() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as EpochMillis
}
