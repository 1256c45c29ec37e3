//! Unified error type for cache operations.

use thiserror::Error;

/// Unified error type for SqlCache.
///
/// A missing or logically expired key is not an error; reads report it as
/// `Ok(None)`. Sweep failures never surface here either, they are handed to
/// the event sink instead.
#[derive(Error, Debug)]
pub enum CacheError {
    // ============ Request Errors ============
    /// Key is empty or exceeds the column bound.
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Expiration options cannot produce a deadline in the future.
    #[error("Invalid expiration configuration: {0}")]
    InvalidExpirationConfiguration(String),

    // ============ Storage Errors ============
    /// Connection, pool or statement failure.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The cache table is missing or does not have the expected shape.
    #[error("Cache table unavailable: {0}")]
    SchemaUnavailable(String),

    /// A stored row could not be converted into a cache record.
    #[error("Corrupt cache record '{key}': {message}")]
    CorruptRecord { key: String, message: String },

    // ============ Setup Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::InvalidExpirationConfiguration(_) => "INVALID_EXPIRATION_CONFIGURATION",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Self::SchemaUnavailable(_) => "SCHEMA_UNAVAILABLE",
            Self::CorruptRecord { .. } => "CORRUPT_RECORD",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates an invalid key error.
    #[must_use]
    pub fn invalid_key<T: Into<String>>(message: T) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Creates an invalid expiration configuration error.
    #[must_use]
    pub fn invalid_expiration<T: Into<String>>(message: T) -> Self {
        Self::InvalidExpirationConfiguration(message.into())
    }

    /// Creates a storage unavailable error.
    #[must_use]
    pub fn storage<T: Into<String>>(message: T) -> Self {
        Self::StorageUnavailable(message.into())
    }

    /// Creates a corrupt record error.
    #[must_use]
    pub fn corrupt_record<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::CorruptRecord {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Checks if this error is retriable.
    ///
    /// Nothing in this crate retries; callers use this to drive their own
    /// policy.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Checks if this error was raised before any storage call was made.
    #[must_use]
    pub const fn is_rejected_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey(_) | Self::InvalidExpirationConfiguration(_)
        )
    }
}

#[cfg(feature = "sqlx")]
impl CacheError {
    /// Converts a failure while reading the row stored under `key`.
    ///
    /// A value that cannot be decoded makes the record corrupt; anything else
    /// converts as usual.
    #[must_use]
    pub fn from_row_error(key: &str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::corrupt_record(key, format!("row decoding failed: {}", err))
            }
            other => other.into(),
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => Self::SchemaUnavailable(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::corrupt_record("<unknown>", format!("row decoding failed: {}", err))
            }
            _ => Self::StorageUnavailable(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}
