//! DAO implementations.
//!
//! Trait definitions live in the parent `dao/` module.

pub mod sql_cache_item_dao;

pub use sql_cache_item_dao::SqlCacheItemDao;
