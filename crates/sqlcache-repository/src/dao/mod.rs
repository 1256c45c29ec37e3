//! DAO (Data Access Object) layer.
//!
//! The DAO issues exactly one statement per call against the cache table and
//! knows nothing about expiration policy. Policy lives one layer up in
//! [`SqlCacheOperations`](crate::SqlCacheOperations).

pub mod cache_item_dao;
pub mod r#impl;

pub use cache_item_dao::CacheItemDao;
pub use r#impl::SqlCacheItemDao;

#[cfg(test)]
pub use cache_item_dao::MockCacheItemDao;
