//! Cache operation trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlcache_core::{CacheEntryOptions, CacheResult, Interface};

/// Distributed cache operations over a relational table.
///
/// Operations are individually atomic at the statement level; none of them
/// is composed transactionally with another.
#[async_trait]
pub trait CacheOperations: Interface + Send + Sync {
    /// Verifies the cache table exists and has the expected columns.
    ///
    /// Intended to run once at startup; never retried here.
    async fn probe(&self) -> CacheResult<()>;

    /// Returns the value for `key`, or `None` if it is missing or logically
    /// expired. Slides the deadline of sliding entries.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Slides the deadline of `key` without returning its value.
    async fn refresh(&self, key: &str) -> CacheResult<()>;

    /// Writes `value` under `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: &[u8], options: &CacheEntryOptions) -> CacheResult<()>;

    /// Deletes `key`. Succeeds if the key does not exist.
    async fn remove(&self, key: &str) -> CacheResult<()>;

    /// Rewrites the deadline of `key`. A no-op if the key does not exist.
    ///
    /// The stored absolute deadline still caps the result, and an entry with
    /// only an absolute deadline keeps it unchanged.
    async fn extend_expiration(&self, key: &str, expires_at: DateTime<Utc>) -> CacheResult<()>;

    /// Deletes every logically expired entry.
    ///
    /// Never fails: storage errors are reported to the event sink.
    async fn delete_expired_items(&self);
}
