//! `CacheItemDao` trait: single-statement access to the cache table.

use crate::schema::TableInfo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlcache_core::{CacheRecord, CacheResult, ExpirationInfo, Interface};

/// Low-level cache table access object.
///
/// Each method is one round trip on a pooled connection. The connection is
/// returned to the pool on every exit path, including cancellation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheItemDao: Interface + Send + Sync {
    /// Returns `schema.table` for diagnostics.
    fn table_name(&self) -> String;

    /// Reads the table descriptor. `None` if the table does not exist.
    async fn find_table(&self) -> CacheResult<Option<TableInfo>>;

    /// Finds the record for `key` whose deadline is after `now`.
    async fn find_unexpired(&self, key: &str, now: DateTime<Utc>)
        -> CacheResult<Option<CacheRecord>>;

    /// Inserts the record or replaces its value and every expiry field.
    async fn upsert(&self, key: &str, value: &[u8], expiration: &ExpirationInfo)
        -> CacheResult<()>;

    /// Rewrites only the deadline, never past the stored absolute deadline.
    /// Records with an absolute deadline and no sliding window keep it.
    /// Returns `false` if no row matched.
    async fn update_expiration(&self, key: &str, expires_at: DateTime<Utc>) -> CacheResult<bool>;

    /// Deletes the record. Returns `false` if no row matched.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Deletes every record whose deadline is at or before `now`.
    /// Returns the number of rows removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> CacheResult<u64>;
}
