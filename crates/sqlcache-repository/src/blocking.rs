//! Blocking facade over [`CacheOperations`].
//!
//! Every method drives the async operation to completion on a runtime
//! handle, so ordering and results are identical to the async calls.

use crate::traits::CacheOperations;
use chrono::{DateTime, Utc};
use sqlcache_core::{CacheEntryOptions, CacheResult};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Synchronous cache client.
///
/// # Panics
///
/// Every method panics if called from within an async execution context,
/// because it blocks the current thread on the runtime.
#[derive(Clone)]
pub struct BlockingSqlCache {
    inner: Arc<dyn CacheOperations>,
    handle: Handle,
}

impl BlockingSqlCache {
    /// Wraps `inner`, running its futures on `handle`.
    #[must_use]
    pub fn new(inner: Arc<dyn CacheOperations>, handle: Handle) -> Self {
        Self { inner, handle }
    }

    /// See [`CacheOperations::probe`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn probe(&self) -> CacheResult<()> {
        self.handle.block_on(self.inner.probe())
    }

    /// See [`CacheOperations::get`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.handle.block_on(self.inner.get(key))
    }

    /// See [`CacheOperations::refresh`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn refresh(&self, key: &str) -> CacheResult<()> {
        self.handle.block_on(self.inner.refresh(key))
    }

    /// See [`CacheOperations::set`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn set(&self, key: &str, value: &[u8], options: &CacheEntryOptions) -> CacheResult<()> {
        self.handle.block_on(self.inner.set(key, value, options))
    }

    /// See [`CacheOperations::remove`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn remove(&self, key: &str) -> CacheResult<()> {
        self.handle.block_on(self.inner.remove(key))
    }

    /// See [`CacheOperations::extend_expiration`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn extend_expiration(&self, key: &str, expires_at: DateTime<Utc>) -> CacheResult<()> {
        self.handle
            .block_on(self.inner.extend_expiration(key, expires_at))
    }

    /// See [`CacheOperations::delete_expired_items`].
    pub fn delete_expired_items(&self) {
        self.handle.block_on(self.inner.delete_expired_items());
    }
}
