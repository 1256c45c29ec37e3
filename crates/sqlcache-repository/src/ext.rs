//! Typed convenience methods over [`CacheOperations`].

use crate::traits::CacheOperations;
use async_trait::async_trait;
use sqlcache_core::{CacheEntryOptions, CacheError, CacheResult};

/// Extension trait storing strings and JSON documents as cache values.
#[async_trait]
pub trait DistributedCacheExt: CacheOperations {
    /// Gets a UTF-8 string value.
    ///
    /// Returns [`CacheError::CorruptRecord`] if the stored bytes are not
    /// valid UTF-8.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        match self.get(key).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| CacheError::corrupt_record(key, e.to_string())),
            None => Ok(None),
        }
    }

    /// Sets a UTF-8 string value.
    async fn set_string(
        &self,
        key: &str,
        value: &str,
        options: &CacheEntryOptions,
    ) -> CacheResult<()> {
        self.set(key, value.as_bytes(), options).await
    }

    /// Gets a value stored as JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> CacheResult<Option<T>> {
        match self.get(key).await? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Sets a value serialized as JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        options: &CacheEntryOptions,
    ) -> CacheResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes, options).await
    }
}

impl<T: CacheOperations + ?Sized> DistributedCacheExt for T {}
