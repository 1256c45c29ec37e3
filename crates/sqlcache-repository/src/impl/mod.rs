//! Cache operation implementations.
//!
//! Trait definitions live in the parent module (`traits.rs`).

pub mod sql_cache_operations;

pub use sql_cache_operations::SqlCacheOperations;
