//! Per-entry expiration options supplied on write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Expiration options for a single cache write.
///
/// Leaving every field unset writes a permanent entry unless the cache was
/// configured with a default sliding window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryOptions {
    /// Fixed point in time after which the entry is expired.
    #[serde(default)]
    pub absolute_expiration: Option<DateTime<Utc>>,

    /// Absolute deadline expressed relative to the time of the write.
    /// Takes precedence over `absolute_expiration`.
    #[serde(default)]
    pub absolute_expiration_relative_to_now: Option<Duration>,

    /// Window that is reset on every read.
    #[serde(default)]
    pub sliding_expiration: Option<Duration>,
}

impl CacheEntryOptions {
    /// Creates options with no expiration set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a fixed absolute deadline.
    #[must_use]
    pub fn with_absolute_expiration(mut self, deadline: DateTime<Utc>) -> Self {
        self.absolute_expiration = Some(deadline);
        self
    }

    /// Sets an absolute deadline relative to the time of the write.
    #[must_use]
    pub fn with_absolute_expiration_relative_to_now(mut self, ttl: Duration) -> Self {
        self.absolute_expiration_relative_to_now = Some(ttl);
        self
    }

    /// Sets a sliding window.
    #[must_use]
    pub fn with_sliding_expiration(mut self, window: Duration) -> Self {
        self.sliding_expiration = Some(window);
        self
    }

    /// Returns true if any expiration is set.
    #[must_use]
    pub const fn has_expiration(&self) -> bool {
        self.absolute_expiration.is_some()
            || self.absolute_expiration_relative_to_now.is_some()
            || self.sliding_expiration.is_some()
    }
}
