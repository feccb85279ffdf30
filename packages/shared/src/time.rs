//! Time-related utilities with clock abstraction for testability.
//!
//! Chat timestamps are Unix epoch seconds, rendered in UTC.

use chrono::{DateTime, Utc};

/// Display format for chat timestamps
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (seconds)
    fn now_unix_seconds(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_seconds(&self) -> i64 {
        now_unix_seconds()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_seconds: i64) -> Self {
        Self {
            fixed_time: fixed_time_seconds,
        }
    }
}

impl Clock for FixedClock {
    fn now_unix_seconds(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (seconds)
pub fn now_unix_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Render a Unix timestamp (seconds) as `YYYY-MM-DD HH:MM:SS` in UTC
///
/// Timestamps outside chrono's supported range are rendered as the raw number.
pub fn format_unix_seconds(timestamp_seconds: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp_seconds, 0) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => timestamp_seconds.to_string(),
    }
}
