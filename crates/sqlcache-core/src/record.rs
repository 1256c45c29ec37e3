//! Cache record and expiration value types.

use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;

/// Deadline persisted for entries written without any expiration.
///
/// `ExpiresAtTime` is not nullable, so permanent entries carry the latest
/// timestamp every supported backend can store.
#[must_use]
pub fn never_expires() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map_or(DateTime::<Utc>::MAX_UTC, |naive| naive.and_utc())
}

/// Expiry fields computed at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationInfo {
    /// The single authoritative deadline.
    pub expires_at: DateTime<Utc>,
    /// Sliding window to persist, if any.
    pub sliding_expiration: Option<Duration>,
    /// Absolute cap to persist, if any.
    pub absolute_expiration: Option<DateTime<Utc>>,
}

/// One stored cache row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub key: String,
    pub value: Vec<u8>,
    pub expires_at: DateTime<Utc>,
    pub sliding_expiration: Option<Duration>,
    pub absolute_expiration: Option<DateTime<Utc>>,
}

impl CacheRecord {
    /// Returns true if the record is logically expired at `now`.
    ///
    /// A logically expired record may still exist physically until the next
    /// sweep; reads must treat it as absent.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
