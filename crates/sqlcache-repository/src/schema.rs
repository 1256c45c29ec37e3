//! Cache table layout and value encoding.
//!
//! Every backend reads and writes the same five columns:
//!
//! | Column                     | Rust side                    | Null |
//! |----------------------------|------------------------------|------|
//! | `Id`                       | `String`, at most 100 chars  | no   |
//! | `Value`                    | `Vec<u8>`                    | no   |
//! | `ExpiresAtTime`            | `DateTime<Utc>`              | no   |
//! | `SlidingExpirationInTicks` | `i64`, 100 ns ticks          | yes  |
//! | `AbsoluteExpiration`       | `DateTime<Utc>`              | yes  |

use chrono::{DateTime, SubsecRound, Utc};
use sqlcache_core::{CacheError, CacheRecord, CacheResult, ExpirationInfo};
use sqlx::FromRow;
use std::time::Duration;

pub const ID_COLUMN: &str = "Id";
pub const VALUE_COLUMN: &str = "Value";
pub const EXPIRES_AT_COLUMN: &str = "ExpiresAtTime";
pub const SLIDING_EXPIRATION_COLUMN: &str = "SlidingExpirationInTicks";
pub const ABSOLUTE_EXPIRATION_COLUMN: &str = "AbsoluteExpiration";

/// All columns, in statement order.
pub const COLUMNS: [&str; 5] = [
    ID_COLUMN,
    VALUE_COLUMN,
    EXPIRES_AT_COLUMN,
    SLIDING_EXPIRATION_COLUMN,
    ABSOLUTE_EXPIRATION_COLUMN,
];

/// Maximum key length in characters.
pub const MAX_KEY_LENGTH: usize = 100;

/// Values shorter than this many bytes are sent with a size hint.
pub const VALUE_SIZE_HINT_THRESHOLD: usize = 8000;

const NANOS_PER_TICK: u128 = 100;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Rejects keys the `Id` column cannot hold.
///
/// Runs before any statement is prepared, so an oversized key never costs a
/// round trip.
///
/// # Errors
///
/// Returns [`CacheError::InvalidKey`] if the key is empty or longer than
/// [`MAX_KEY_LENGTH`] characters.
pub fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::invalid_key("key must not be empty"));
    }
    let length = key.chars().count();
    if length > MAX_KEY_LENGTH {
        return Err(CacheError::invalid_key(format!(
            "key is {} characters long, the limit is {}",
            length, MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// How a value is shipped to the backing store.
///
/// Small values get a size hint and a persistent (server-cached) prepared
/// statement; large ones are sent unsized through a one-shot statement so
/// they do not pollute the statement cache. Stored bytes are identical
/// either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    /// Below the threshold; carries the byte length as its hint.
    Sized(usize),
    /// At or above the threshold.
    Unsized,
}

impl ValueEncoding {
    /// Picks the encoding for `value`.
    #[must_use]
    pub const fn for_value(value: &[u8]) -> Self {
        if value.len() < VALUE_SIZE_HINT_THRESHOLD {
            Self::Sized(value.len())
        } else {
            Self::Unsized
        }
    }

    /// Returns the size hint, if any.
    #[must_use]
    pub const fn size_hint(&self) -> Option<usize> {
        match self {
            Self::Sized(len) => Some(*len),
            Self::Unsized => None,
        }
    }

    /// Returns true if the statement should stay in the statement cache.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Sized(_))
    }
}

/// Truncates a timestamp to the millisecond precision every backend stores.
///
/// Values compared against stored deadlines must go through this first, or a
/// refreshed deadline would never compare equal to its stored form.
#[must_use]
pub fn to_storage_precision(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(3)
}

/// Encodes a duration as 100 ns ticks.
///
/// # Errors
///
/// Returns [`CacheError::InvalidExpirationConfiguration`] if the duration is
/// shorter than one tick or does not fit in an `i64`.
pub fn duration_to_ticks(duration: Duration) -> CacheResult<i64> {
    let ticks = duration.as_nanos() / NANOS_PER_TICK;
    if ticks == 0 {
        return Err(CacheError::invalid_expiration(format!(
            "duration {:?} is shorter than one 100ns tick",
            duration
        )));
    }
    i64::try_from(ticks).map_err(|_| {
        CacheError::invalid_expiration(format!("duration {:?} is too long to store", duration))
    })
}

/// Decodes 100 ns ticks. `None` for a negative count.
#[must_use]
pub fn ticks_to_duration(ticks: i64) -> Option<Duration> {
    if ticks < 0 {
        return None;
    }
    let secs = ticks / TICKS_PER_SECOND;
    let remainder = ticks % TICKS_PER_SECOND;
    // remainder < 10^7, so remainder * 100 < 10^9
    let nanos = u32::try_from(remainder * 100).ok()?;
    Some(Duration::new(secs.unsigned_abs(), nanos))
}

/// One row of the cache table, exactly as the driver decodes it.
#[derive(Debug, Clone, FromRow)]
pub struct CacheItemRow {
    #[sqlx(rename = "Id")]
    pub id: String,
    #[sqlx(rename = "Value")]
    pub value: Vec<u8>,
    #[sqlx(rename = "ExpiresAtTime")]
    pub expires_at_time: DateTime<Utc>,
    #[sqlx(rename = "SlidingExpirationInTicks")]
    pub sliding_expiration_in_ticks: Option<i64>,
    #[sqlx(rename = "AbsoluteExpiration")]
    pub absolute_expiration: Option<DateTime<Utc>>,
}

impl TryFrom<CacheItemRow> for CacheRecord {
    type Error = CacheError;

    fn try_from(row: CacheItemRow) -> Result<Self, Self::Error> {
        let sliding_expiration = match row.sliding_expiration_in_ticks {
            Some(ticks) => Some(ticks_to_duration(ticks).ok_or_else(|| {
                CacheError::corrupt_record(
                    row.id.as_str(),
                    format!("negative sliding expiration ({} ticks)", ticks),
                )
            })?),
            None => None,
        };

        Ok(CacheRecord {
            key: row.id,
            value: row.value,
            expires_at: row.expires_at_time,
            sliding_expiration,
            absolute_expiration: row.absolute_expiration,
        })
    }
}

/// Expiry fields in their column form, ready to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedExpiration {
    pub expires_at_time: DateTime<Utc>,
    pub sliding_expiration_in_ticks: Option<i64>,
    pub absolute_expiration: Option<DateTime<Utc>>,
}

impl TryFrom<&ExpirationInfo> for EncodedExpiration {
    type Error = CacheError;

    fn try_from(info: &ExpirationInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            expires_at_time: to_storage_precision(info.expires_at),
            sliding_expiration_in_ticks: info
                .sliding_expiration
                .map(duration_to_ticks)
                .transpose()?,
            absolute_expiration: info.absolute_expiration.map(to_storage_precision),
        })
    }
}

/// Descriptor of the cache table found by the startup probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub schema_name: String,
    pub table_name: String,
    pub columns: Vec<String>,
}

impl TableInfo {
    /// Returns the required columns the table lacks. Case-insensitive.
    #[must_use]
    pub fn missing_columns(&self) -> Vec<&'static str> {
        COLUMNS
            .iter()
            .copied()
            .filter(|required| {
                !self
                    .columns
                    .iter()
                    .any(|column| column.eq_ignore_ascii_case(required))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_key_bounds() {
        assert!(validate_key("k").is_ok());
        assert!(validate_key(&"a".repeat(MAX_KEY_LENGTH)).is_ok());
        assert!(matches!(
            validate_key(&"a".repeat(MAX_KEY_LENGTH + 1)),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(validate_key(""), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_validate_key_counts_characters_not_bytes() {
        // 100 characters, 250 bytes
        let key = "\u{00e9}\u{4e2d}".repeat(50);
        assert!(key.len() > MAX_KEY_LENGTH);
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn test_value_encoding_threshold() {
        let small = vec![0u8; VALUE_SIZE_HINT_THRESHOLD - 1];
        let boundary = vec![0u8; VALUE_SIZE_HINT_THRESHOLD];

        assert_eq!(
            ValueEncoding::for_value(&small),
            ValueEncoding::Sized(VALUE_SIZE_HINT_THRESHOLD - 1)
        );
        assert!(ValueEncoding::for_value(&small).is_persistent());

        let large = ValueEncoding::for_value(&boundary);
        assert_eq!(large, ValueEncoding::Unsized);
        assert_eq!(large.size_hint(), None);
        assert!(!large.is_persistent());
    }

    #[test]
    fn test_ticks() {
        assert_eq!(duration_to_ticks(Duration::from_secs(1)).unwrap(), 10_000_000);
        assert_eq!(duration_to_ticks(Duration::from_millis(1500)).unwrap(), 15_000_000);
        assert_eq!(ticks_to_duration(15_000_000), Some(Duration::from_millis(1500)));
        assert_eq!(ticks_to_duration(0), Some(Duration::ZERO));
        assert_eq!(ticks_to_duration(-1), None);
    }

    #[test]
    fn test_ticks_reject_unrepresentable() {
        assert!(duration_to_ticks(Duration::from_nanos(50)).is_err());
        assert!(duration_to_ticks(Duration::MAX).is_err());
    }

    #[test]
    fn test_storage_precision() {
        let time = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let truncated = to_storage_precision(time);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(to_storage_precision(truncated), truncated);
    }

    fn row(ticks: Option<i64>) -> CacheItemRow {
        CacheItemRow {
            id: "user:1".to_string(),
            value: b"payload".to_vec(),
            expires_at_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap(),
            sliding_expiration_in_ticks: ticks,
            absolute_expiration: None,
        }
    }

    #[test]
    fn test_row_to_record() {
        let record = CacheRecord::try_from(row(Some(20_000_000))).unwrap();
        assert_eq!(record.key, "user:1");
        assert_eq!(record.value, b"payload");
        assert_eq!(record.sliding_expiration, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_row_with_negative_ticks_is_corrupt() {
        let err = CacheRecord::try_from(row(Some(-5))).unwrap_err();
        assert!(matches!(err, CacheError::CorruptRecord { ref key, .. } if key == "user:1"));
    }

    #[test]
    fn test_encoded_expiration_truncates() {
        let info = ExpirationInfo {
            expires_at: Utc.timestamp_opt(1_700_000_000, 999_999_999).unwrap(),
            sliding_expiration: Some(Duration::from_secs(30)),
            absolute_expiration: None,
        };
        let encoded = EncodedExpiration::try_from(&info).unwrap();
        assert_eq!(encoded.expires_at_time.timestamp_subsec_millis(), 999);
        assert_eq!(encoded.expires_at_time.timestamp_subsec_nanos(), 999_000_000);
        assert_eq!(encoded.sliding_expiration_in_ticks, Some(300_000_000));
    }

    #[test]
    fn test_missing_columns() {
        let info = TableInfo {
            schema_name: "main".to_string(),
            table_name: "CacheItems".to_string(),
            columns: vec!["id".to_string(), "Value".to_string(), "ExpiresAtTime".to_string()],
        };
        assert_eq!(
            info.missing_columns(),
            vec![SLIDING_EXPIRATION_COLUMN, ABSOLUTE_EXPIRATION_COLUMN]
        );
    }
}
