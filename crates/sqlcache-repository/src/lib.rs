//! # SqlCache Repository
//!
//! Distributed cache storage on a relational table:
//!
//! ```text
//! Caller
//!   ↓  Arc<dyn CacheOperations>  (cache interface)
//! SqlCacheOperations            (expiration contract)
//!   ↓  Arc<dyn CacheItemDao>     (DAO interface)
//! SqlCacheItemDao               (DAO impl, SQLx)
//!   ↓
//! MySQL / SQLite
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   traits.rs                    ← CacheOperations trait
//!   impl/
//!     sql_cache_operations.rs    ← SqlCacheOperations
//!   dao/
//!     cache_item_dao.rs          ← CacheItemDao trait
//!     impl/
//!       sql_cache_item_dao.rs    ← SqlCacheItemDao
//!   schema.rs                    ← columns, key and value encoding
//!   queries.rs                   ← per-dialect statements
//!   pool.rs                      ← DatabasePool
//!   events.rs                    ← sweep diagnostics sink
//!   ext.rs                       ← string / JSON helpers
//!   blocking.rs                  ← synchronous facade
//! ```
//!
//! ## Table
//!
//! Provisioning is left to the deployment. A MySQL table matching the
//! statements used here:
//!
//! ```sql
//! CREATE TABLE CacheItems (
//!     Id                       VARCHAR(100) NOT NULL PRIMARY KEY,
//!     Value                    LONGBLOB     NOT NULL,
//!     ExpiresAtTime            DATETIME(3)  NOT NULL,
//!     SlidingExpirationInTicks BIGINT       NULL,
//!     AbsoluteExpiration       DATETIME(3)  NULL,
//!     INDEX IX_ExpiresAtTime (ExpiresAtTime)
//! );
//! ```

pub mod blocking;
pub mod dao;
pub mod events;
pub mod ext;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod traits;
pub mod r#impl;

pub use blocking::BlockingSqlCache;
pub use dao::{CacheItemDao, SqlCacheItemDao};
pub use events::{CacheEventSink, TracingEventSink};
pub use ext::DistributedCacheExt;
pub use pool::DatabasePool;
pub use queries::{SqlDialect, SqlQueries};
pub use r#impl::SqlCacheOperations;
pub use schema::TableInfo;
pub use traits::*;
