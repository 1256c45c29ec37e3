//! Checks a merged [`CacheConfig`] before anything connects.
//!
//! Schema and table names end up inside SQL text, so they are held to a
//! strict identifier alphabet here.

use crate::{CacheConfig, CacheTableConfig, DatabaseConfig, ExpirationConfig};
use std::fmt;

/// A single problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// `min_connections` is above `max_connections`.
    InvalidPoolSize { min: u32, max: u32 },
    /// `max_connections` is above the hard ceiling.
    PoolSizeTooLarge { value: u32, maximum: u32 },
    /// Database URL is empty or uses an unsupported scheme.
    InvalidUrl { message: String },
    /// A timeout is zero.
    NonPositiveTimeout { name: String, value: u64 },
    /// Schema or table name is not a safe SQL identifier.
    InvalidIdentifier { name: String, value: String },
    /// Default sliding expiration must be positive.
    NonPositiveSlidingExpiration,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "min_connections ({}) is greater than max_connections ({})",
                    min, max
                )
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(
                    f,
                    "max_connections ({}) is above the limit of {}",
                    value, maximum
                )
            }
            Self::InvalidUrl { message } => {
                write!(f, "Invalid database URL: {}", message)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "{} must be at least 1 second, got {}", name, value)
            }
            Self::InvalidIdentifier { name, value } => {
                write!(
                    f,
                    "Invalid {} '{}': use 1-64 ASCII letters, digits or underscores, not starting with a digit",
                    name, value
                )
            }
            Self::NonPositiveSlidingExpiration => {
                write!(f, "Default sliding expiration must be positive")
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Validates cache configuration.
pub struct ConfigValidator;

impl ConfigValidator {
    const MAX_POOL_SIZE: u32 = 1000;
    /// Maximum identifier length accepted by MySQL.
    const MAX_IDENTIFIER_LENGTH: usize = 64;

    /// Validates every section and reports all problems at once.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in section order.
    pub fn validate(config: &CacheConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::check_database(&config.database, &mut errors);
        Self::check_table(&config.table, &mut errors);
        Self::check_expiration(&config.expiration, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Returns true if `value` can be quoted into SQL as an identifier.
    #[must_use]
    pub fn is_safe_identifier(value: &str) -> bool {
        let mut chars = value.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return false,
        }
        value.len() <= Self::MAX_IDENTIFIER_LENGTH
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn check_database(config: &DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                message: "no URL configured".to_string(),
            });
        } else if config.backend().is_none() {
            errors.push(ConfigValidationError::InvalidUrl {
                message: "URL must start with mysql://, mariadb:// or sqlite:".to_string(),
            });
        }

        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
        if config.idle_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.idle_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn check_table(config: &CacheTableConfig, errors: &mut Vec<ConfigValidationError>) {
        if !Self::is_safe_identifier(&config.schema_name) {
            errors.push(ConfigValidationError::InvalidIdentifier {
                name: "table.schema_name".to_string(),
                value: config.schema_name.clone(),
            });
        }
        if !Self::is_safe_identifier(&config.table_name) {
            errors.push(ConfigValidationError::InvalidIdentifier {
                name: "table.table_name".to_string(),
                value: config.table_name.clone(),
            });
        }
    }

    fn check_expiration(config: &ExpirationConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.default_sliding_expiration_secs == Some(0) {
            errors.push(ConfigValidationError::NonPositiveSlidingExpiration);
        }
    }
}

/// Renders validation errors as a numbered list.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    errors.iter().enumerate().fold(
        String::from("Configuration validation failed:\n"),
        |mut output, (i, error)| {
            output.push_str(&format!("  {}. {}\n", i + 1, error));
            output
        },
    )
}
