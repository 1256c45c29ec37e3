//! Common test infrastructure for database integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use sqlcache_config::{CacheTableConfig, ExpirationConfig};
use sqlcache_core::{CacheError, ManualClock};
use sqlcache_repository::{CacheEventSink, DatabasePool, SqlCacheOperations};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

const CREATE_TABLE: &str = r#"
    CREATE TABLE "CacheItems" (
        "Id"                       TEXT    NOT NULL PRIMARY KEY,
        "Value"                    BLOB    NOT NULL,
        "ExpiresAtTime"            TEXT    NOT NULL,
        "SlidingExpirationInTicks" INTEGER NULL,
        "AbsoluteExpiration"       TEXT    NULL
    )
"#;

const CREATE_INDEX: &str =
    r#"CREATE INDEX "IX_CacheItems_ExpiresAtTime" ON "CacheItems" ("ExpiresAtTime")"#;

/// Fixed start instant for every test clock.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// In-memory SQLite database holding the cache table.
///
/// A single connection that never idles out keeps the in-memory database
/// alive for the lifetime of the fixture.
pub struct TestDatabase {
    raw: SqlitePool,
    pool: DatabasePool,
}

impl TestDatabase {
    /// Creates a database with the cache table provisioned.
    pub async fn new() -> Self {
        let db = Self::without_table().await;
        db.execute(CREATE_TABLE).await;
        db.execute(CREATE_INDEX).await;
        db
    }

    /// Creates an empty database.
    pub async fn without_table() -> Self {
        let raw = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite");

        Self {
            pool: DatabasePool::from_sqlite(raw.clone()),
            raw,
        }
    }

    /// Returns the cache pool.
    pub fn pool(&self) -> DatabasePool {
        self.pool.clone()
    }

    /// Returns the table location used by the fixture.
    pub fn table() -> CacheTableConfig {
        CacheTableConfig::new("main", "CacheItems")
    }

    /// Builds cache operations on this database.
    pub fn cache(&self, clock: &ManualClock, sink: Arc<RecordingEventSink>) -> SqlCacheOperations {
        self.cache_with(clock, sink, &ExpirationConfig::default())
    }

    /// Builds cache operations with explicit expiration defaults.
    pub fn cache_with(
        &self,
        clock: &ManualClock,
        sink: Arc<RecordingEventSink>,
        expiration: &ExpirationConfig,
    ) -> SqlCacheOperations {
        SqlCacheOperations::new(
            self.pool.cache_item_dao(&Self::table()),
            Arc::new(clock.clone()),
            sink,
            expiration,
        )
    }

    /// Runs a raw statement against the database.
    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql)
            .execute(&self.raw)
            .await
            .expect("Failed to execute statement");
    }

    /// Reads the stored deadline of `key`, ignoring expiry.
    pub async fn stored_expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        sqlx::query_scalar(r#"SELECT "ExpiresAtTime" FROM "CacheItems" WHERE "Id" = ?"#)
            .bind(key)
            .fetch_optional(&self.raw)
            .await
            .expect("Failed to read ExpiresAtTime")
    }

    /// Counts physical rows, expired or not.
    pub async fn row_count(&self) -> i64 {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM "CacheItems""#)
            .fetch_one(&self.raw)
            .await
            .expect("Failed to count rows")
    }
}

/// Event sink capturing sweep outcomes.
#[derive(Default)]
pub struct RecordingEventSink {
    pub completed: Mutex<Vec<u64>>,
    pub failed: Mutex<Vec<String>>,
}

impl RecordingEventSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl CacheEventSink for RecordingEventSink {
    fn sweep_completed(&self, removed: u64) {
        self.completed.lock().push(removed);
    }

    fn sweep_failed(&self, error: &CacheError) {
        self.failed.lock().push(error.error_code().to_string());
    }
}
