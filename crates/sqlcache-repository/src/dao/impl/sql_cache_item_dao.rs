//! SQLx implementation of [`CacheItemDao`] for MySQL and SQLite.

use crate::dao::CacheItemDao;
use crate::pool::DatabasePool;
use crate::queries::{SqlDialect, SqlQueries};
use crate::schema::{to_storage_precision, CacheItemRow, EncodedExpiration, TableInfo, ValueEncoding};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlcache_config::CacheTableConfig;
use sqlcache_core::{CacheError, CacheRecord, CacheResult, ExpirationInfo};
use tracing::debug;

/// Runs the same statement body against whichever pool variant is live.
///
/// The body is expanded once per backend so each arm type-checks against its
/// own driver.
macro_rules! on_pool {
    ($pool:expr, |$conn:ident| $body:expr) => {
        match $pool {
            DatabasePool::MySql($conn) => $body,
            DatabasePool::Sqlite($conn) => $body,
        }
    };
}

/// Cache table DAO over a [`DatabasePool`].
///
/// Statements are rendered once at construction for the pool's dialect.
/// Every timestamp is truncated to storage precision before it is bound.
pub struct SqlCacheItemDao {
    pool: DatabasePool,
    queries: SqlQueries,
    table: CacheTableConfig,
}

impl SqlCacheItemDao {
    /// Creates a DAO for `table` on `pool`.
    #[must_use]
    pub fn new(pool: DatabasePool, table: CacheTableConfig) -> Self {
        let queries = SqlQueries::new(SqlDialect::from(pool.backend()), &table);
        Self {
            pool,
            queries,
            table,
        }
    }
}

#[async_trait]
impl CacheItemDao for SqlCacheItemDao {
    fn table_name(&self) -> String {
        self.table.qualified_name()
    }

    async fn find_table(&self) -> CacheResult<Option<TableInfo>> {
        let schema = self.table.schema_name.as_str();
        let table = self.table.table_name.as_str();
        debug!("DAO: find_table {}.{}", schema, table);

        let columns: Vec<String> = match &self.pool {
            DatabasePool::MySql(pool) => {
                sqlx::query_scalar(&self.queries.table_columns)
                    .bind(schema)
                    .bind(table)
                    .fetch_all(pool)
                    .await?
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query_scalar(&self.queries.table_columns)
                    .bind(table)
                    .bind(schema)
                    .fetch_all(pool)
                    .await?
            }
        };

        if columns.is_empty() {
            return Ok(None);
        }

        Ok(Some(TableInfo {
            schema_name: schema.to_string(),
            table_name: table.to_string(),
            columns,
        }))
    }

    async fn find_unexpired(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> CacheResult<Option<CacheRecord>> {
        debug!("DAO: find_unexpired {}", key);
        let now = to_storage_precision(now);

        let row = on_pool!(&self.pool, |pool| {
            sqlx::query_as::<_, CacheItemRow>(&self.queries.get_unexpired)
                .bind(key)
                .bind(now)
                .fetch_optional(pool)
                .await
                .map_err(|e| CacheError::from_row_error(key, e))?
        });

        row.map(CacheRecord::try_from).transpose()
    }

    async fn upsert(
        &self,
        key: &str,
        value: &[u8],
        expiration: &ExpirationInfo,
    ) -> CacheResult<()> {
        let encoded = EncodedExpiration::try_from(expiration)?;
        let encoding = ValueEncoding::for_value(value);
        debug!(
            key,
            size_hint = ?encoding.size_hint(),
            expires_at = %encoded.expires_at_time,
            "DAO: upsert"
        );

        on_pool!(&self.pool, |pool| {
            sqlx::query(&self.queries.upsert)
                .bind(key)
                .bind(value)
                .bind(encoded.expires_at_time)
                .bind(encoded.sliding_expiration_in_ticks)
                .bind(encoded.absolute_expiration)
                .persistent(encoding.is_persistent())
                .execute(pool)
                .await?;
        });

        Ok(())
    }

    async fn update_expiration(&self, key: &str, expires_at: DateTime<Utc>) -> CacheResult<bool> {
        let expires_at = to_storage_precision(expires_at);
        debug!("DAO: update_expiration {} -> {}", key, expires_at);

        let affected = on_pool!(&self.pool, |pool| {
            sqlx::query(&self.queries.update_expiration)
                .bind(expires_at)
                .bind(expires_at)
                .bind(key)
                .execute(pool)
                .await?
                .rows_affected()
        });

        Ok(affected > 0)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        debug!("DAO: delete {}", key);

        let affected = on_pool!(&self.pool, |pool| {
            sqlx::query(&self.queries.delete)
                .bind(key)
                .execute(pool)
                .await?
                .rows_affected()
        });

        Ok(affected > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> CacheResult<u64> {
        let now = to_storage_precision(now);
        debug!("DAO: delete_expired at {}", now);

        let affected = on_pool!(&self.pool, |pool| {
            sqlx::query(&self.queries.delete_expired)
                .bind(now)
                .execute(pool)
                .await?
                .rows_affected()
        });

        Ok(affected)
    }
}
