//! SQL statements for the cache table.
//!
//! Statements are rendered once per DAO. Schema and table names are quoted
//! identifiers; every value is a bound parameter.

use crate::schema::{
    ABSOLUTE_EXPIRATION_COLUMN, EXPIRES_AT_COLUMN, ID_COLUMN, SLIDING_EXPIRATION_COLUMN,
    VALUE_COLUMN,
};
use sqlcache_config::{CacheTableConfig, DatabaseBackend};

/// SQL flavour of the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    MySql,
    Sqlite,
}

impl SqlDialect {
    /// Quotes an identifier, doubling any embedded quote character.
    #[must_use]
    pub fn quote(self, identifier: &str) -> String {
        let quote = match self {
            Self::MySql => '`',
            Self::Sqlite => '"',
        };
        let escaped = identifier.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }
}

impl From<DatabaseBackend> for SqlDialect {
    fn from(backend: DatabaseBackend) -> Self {
        match backend {
            DatabaseBackend::MySql => Self::MySql,
            DatabaseBackend::Sqlite => Self::Sqlite,
        }
    }
}

/// The six statements the cache issues.
#[derive(Debug, Clone)]
pub struct SqlQueries {
    /// Lists the table's columns. MySQL binds (schema, table); SQLite binds
    /// (table, schema).
    pub table_columns: String,
    /// Binds (key, now).
    pub get_unexpired: String,
    /// Binds (key, value, expires_at, sliding_ticks, absolute).
    pub upsert: String,
    /// Binds (expires_at, expires_at, key). An absolute deadline caps the
    /// new value and pins records that have no sliding window.
    pub update_expiration: String,
    /// Binds (key).
    pub delete: String,
    /// Binds (now).
    pub delete_expired: String,
}

impl SqlQueries {
    /// Renders the statements for `table` in `dialect`.
    #[must_use]
    pub fn new(dialect: SqlDialect, table: &CacheTableConfig) -> Self {
        let q = |identifier: &str| dialect.quote(identifier);
        let target = format!("{}.{}", q(&table.schema_name), q(&table.table_name));

        let id = q(ID_COLUMN);
        let value = q(VALUE_COLUMN);
        let expires_at = q(EXPIRES_AT_COLUMN);
        let sliding = q(SLIDING_EXPIRATION_COLUMN);
        let absolute = q(ABSOLUTE_EXPIRATION_COLUMN);
        let columns = format!("{id}, {value}, {expires_at}, {sliding}, {absolute}");

        let table_columns = match dialect {
            SqlDialect::MySql => "SELECT CAST(COLUMN_NAME AS CHAR) AS name \
                 FROM INFORMATION_SCHEMA.COLUMNS \
                 WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
                 ORDER BY ORDINAL_POSITION"
                .to_string(),
            SqlDialect::Sqlite => "SELECT name FROM pragma_table_info(?, ?) ORDER BY cid".to_string(),
        };

        let upsert = match dialect {
            SqlDialect::MySql => format!(
                "INSERT INTO {target} ({columns}) VALUES (?, ?, ?, ?, ?) \
                 ON DUPLICATE KEY UPDATE \
                 {value} = VALUES({value}), \
                 {expires_at} = VALUES({expires_at}), \
                 {sliding} = VALUES({sliding}), \
                 {absolute} = VALUES({absolute})"
            ),
            SqlDialect::Sqlite => format!(
                "INSERT INTO {target} ({columns}) VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT({id}) DO UPDATE SET \
                 {value} = excluded.{value}, \
                 {expires_at} = excluded.{expires_at}, \
                 {sliding} = excluded.{sliding}, \
                 {absolute} = excluded.{absolute}"
            ),
        };

        Self {
            table_columns,
            get_unexpired: format!(
                "SELECT {columns} FROM {target} WHERE {id} = ? AND {expires_at} > ?"
            ),
            upsert,
            update_expiration: format!(
                "UPDATE {target} SET {expires_at} = CASE \
                 WHEN {absolute} IS NOT NULL AND ({sliding} IS NULL OR {absolute} < ?) \
                 THEN {absolute} ELSE ? END \
                 WHERE {id} = ?"
            ),
            delete: format!("DELETE FROM {target} WHERE {id} = ?"),
            delete_expired: format!("DELETE FROM {target} WHERE {expires_at} <= ?"),
        }
    }
}
