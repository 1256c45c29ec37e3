//! `SqlCacheOperations`: the expiration contract on top of a [`CacheItemDao`].
//!
//! ```text
//! Caller
//!   ↓ Arc<dyn CacheOperations>
//! SqlCacheOperations          ← validates keys, applies expiration policy
//!   ↓ Arc<dyn CacheItemDao>
//! SqlCacheItemDao             ← one statement per call
//!   ↓
//! MySQL / SQLite
//! ```
//!
//! [`CacheItemDao`]: crate::dao::CacheItemDao

use crate::dao::CacheItemDao;
use crate::events::{CacheEventSink, TracingEventSink};
use crate::pool::DatabasePool;
use crate::schema::{to_storage_precision, validate_key};
use crate::traits::CacheOperations;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlcache_config::{CacheConfig, ExpirationConfig};
use sqlcache_core::{
    compute_read_refresh, compute_write_expiration, CacheEntryOptions, CacheError, CacheRecord,
    CacheResult, SystemClock, UtcClock,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache operations backed by a relational table.
pub struct SqlCacheOperations {
    dao: Arc<dyn CacheItemDao>,
    clock: Arc<dyn SystemClock>,
    events: Arc<dyn CacheEventSink>,
    default_sliding_expiration: Option<Duration>,
}

impl SqlCacheOperations {
    /// Creates cache operations from explicit collaborators.
    #[must_use]
    pub fn new(
        dao: Arc<dyn CacheItemDao>,
        clock: Arc<dyn SystemClock>,
        events: Arc<dyn CacheEventSink>,
        expiration: &ExpirationConfig,
    ) -> Self {
        Self {
            dao,
            clock,
            events,
            default_sliding_expiration: expiration.default_sliding_expiration(),
        }
    }

    /// Creates cache operations with the system clock, tracing sink and no
    /// default expiration.
    #[must_use]
    pub fn with_dao(dao: Arc<dyn CacheItemDao>) -> Self {
        Self::new(
            dao,
            Arc::new(UtcClock::new()),
            Arc::new(TracingEventSink),
            &ExpirationConfig::default(),
        )
    }

    /// Connects a pool and builds cache operations from configuration.
    ///
    /// Does not probe the table; call [`CacheOperations::probe`] at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created.
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        let pool = DatabasePool::connect(&config.database).await?;
        Ok(Self::new(
            pool.cache_item_dao(&config.table),
            Arc::new(UtcClock::new()),
            Arc::new(TracingEventSink),
            &config.expiration,
        ))
    }

    fn now(&self) -> DateTime<Utc> {
        to_storage_precision(self.clock.utc_now())
    }

    /// Moves a sliding record's deadline if the policy asks for it.
    async fn slide(&self, record: &CacheRecord, now: DateTime<Utc>) -> CacheResult<()> {
        let next = compute_read_refresh(
            now,
            record.expires_at,
            record.sliding_expiration,
            record.absolute_expiration,
        )
        .map(to_storage_precision)
        .filter(|next| *next != record.expires_at);

        if let Some(next) = next {
            let updated = self.dao.update_expiration(&record.key, next).await?;
            if !updated {
                debug!("Entry {} vanished before its deadline could slide", record.key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CacheOperations for SqlCacheOperations {
    async fn probe(&self) -> CacheResult<()> {
        let table = self.dao.table_name();
        let Some(info) = self.dao.find_table().await? else {
            return Err(CacheError::SchemaUnavailable(format!(
                "table {} does not exist",
                table
            )));
        };

        let missing = info.missing_columns();
        if !missing.is_empty() {
            return Err(CacheError::SchemaUnavailable(format!(
                "table {} is missing columns: {}",
                table,
                missing.join(", ")
            )));
        }

        info!(
            table = %table,
            columns = ?info.columns,
            "Cache table probe succeeded"
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let now = self.now();

        let Some(record) = self.dao.find_unexpired(key, now).await? else {
            debug!("Cache miss: {}", key);
            return Ok(None);
        };

        // The read and the slide are separate round trips. Racing gets may
        // land their updates out of order, so the stored deadline can trail
        // the latest read by the gap between the two clock readings. The
        // value is never rewritten here, so it cannot be lost or corrupted.
        if let Err(e) = self.slide(&record, now).await {
            warn!("Failed to slide expiration of {}: {}", key, e);
        }

        Ok(Some(record.value))
    }

    async fn refresh(&self, key: &str) -> CacheResult<()> {
        validate_key(key)?;
        let now = self.now();

        match self.dao.find_unexpired(key, now).await? {
            Some(record) => self.slide(&record, now).await,
            None => {
                debug!("Nothing to refresh for {}", key);
                Ok(())
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], options: &CacheEntryOptions) -> CacheResult<()> {
        validate_key(key)?;
        let now = self.now();

        let mut options = options.clone();
        if !options.has_expiration() {
            options.sliding_expiration = self.default_sliding_expiration;
        }
        options.absolute_expiration = options.absolute_expiration.map(to_storage_precision);

        let expiration = compute_write_expiration(now, &options)?;
        self.dao.upsert(key, value, &expiration).await
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        validate_key(key)?;
        if !self.dao.delete(key).await? {
            debug!("Remove of absent key {}", key);
        }
        Ok(())
    }

    async fn extend_expiration(&self, key: &str, expires_at: DateTime<Utc>) -> CacheResult<()> {
        validate_key(key)?;
        if !self.dao.update_expiration(key, expires_at).await? {
            debug!("Extend of absent key {}", key);
        }
        Ok(())
    }

    async fn delete_expired_items(&self) {
        let now = self.now();
        match self.dao.delete_expired(now).await {
            Ok(removed) => self.events.sweep_completed(removed),
            Err(e) => self.events.sweep_failed(&e),
        }
    }
}
