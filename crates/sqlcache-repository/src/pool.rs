//! Database connection pool management.

use crate::dao::{CacheItemDao, SqlCacheItemDao};
use sqlcache_config::{CacheTableConfig, DatabaseBackend, DatabaseConfig};
use sqlcache_core::{CacheError, CacheResult};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;
use tracing::{info, warn};

/// Connection pool for one of the supported backends.
///
/// Cloning shares the underlying pool.
#[derive(Clone)]
pub enum DatabasePool {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// The backend is picked from the URL scheme.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Configuration`] for an unsupported URL scheme and
    /// [`CacheError::StorageUnavailable`] if no connection can be opened.
    pub async fn connect(config: &DatabaseConfig) -> CacheResult<Self> {
        let backend = config.backend().ok_or_else(|| {
            CacheError::Configuration("unsupported database URL scheme".to_string())
        })?;

        info!("Connecting to {} database...", backend);

        let pool = match backend {
            DatabaseBackend::MySql => MySqlPoolOptions::new()
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .acquire_timeout(config.connect_timeout())
                .idle_timeout(Some(config.idle_timeout()))
                .connect(&config.url)
                .await
                .map(Self::MySql),
            DatabaseBackend::Sqlite => SqlitePoolOptions::new()
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .acquire_timeout(config.connect_timeout())
                .idle_timeout(Some(config.idle_timeout()))
                .connect(&config.url)
                .await
                .map(Self::Sqlite),
        }
        .map_err(|e| {
            warn!("Failed to connect to database: {}", e);
            CacheError::storage(format!("Failed to connect: {}", e))
        })?;

        info!("{} connection pool established", backend);
        Ok(pool)
    }

    /// Wraps an existing SQLite pool.
    #[must_use]
    pub fn from_sqlite(pool: SqlitePool) -> Self {
        Self::Sqlite(pool)
    }

    /// Returns the backend this pool talks to.
    #[must_use]
    pub const fn backend(&self) -> DatabaseBackend {
        match self {
            Self::MySql(_) => DatabaseBackend::MySql,
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
        }
    }

    /// Checks if the database connection is healthy.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::StorageUnavailable`] if the round trip fails.
    pub async fn health_check(&self) -> CacheResult<()> {
        let result = match self {
            Self::MySql(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Self::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        };
        result.map_err(|e| CacheError::storage(format!("Health check failed: {}", e)))
    }

    /// Closes the database pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        match self {
            Self::MySql(pool) => pool.close().await,
            Self::Sqlite(pool) => pool.close().await,
        }
        info!("Database connection pool closed");
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::MySql(pool) => pool.is_closed(),
            Self::Sqlite(pool) => pool.is_closed(),
        }
    }

    /// Creates the DAO for the cache table on this pool.
    #[must_use]
    pub fn cache_item_dao(&self, table: &CacheTableConfig) -> Arc<dyn CacheItemDao> {
        Arc::new(SqlCacheItemDao::new(self.clone(), table.clone()))
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (size, num_idle) = match self {
            Self::MySql(pool) => (pool.size(), pool.num_idle()),
            Self::Sqlite(pool) => (pool.size(), pool.num_idle()),
        };
        f.debug_struct("DatabasePool")
            .field("backend", &self.backend())
            .field("size", &size)
            .field("num_idle", &num_idle)
            .finish()
    }
}
