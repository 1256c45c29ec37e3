//! Expiration policy.
//!
//! Pure functions that decide a record's deadline. Write-time computation
//! resolves the caller's options into the three persisted expiry fields;
//! read-time computation decides whether a sliding entry's deadline moves.
//!
//! ```text
//! write:  expires_at = min(now + sliding, absolute)   sliding set
//!         expires_at = absolute                        absolute only
//!         expires_at = never_expires()                 neither
//!
//! read:   candidate  = min(now + sliding, absolute)
//!         refresh if candidate != stored expires_at
//! ```

use crate::{never_expires, CacheEntryOptions, CacheError, CacheResult, ExpirationInfo};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Shortest sliding window or relative deadline a write accepts.
///
/// Deadlines are stored at millisecond precision, so anything shorter would
/// truncate to the write instant and the entry would be born expired.
pub const MIN_EXPIRATION_WINDOW: Duration = Duration::from_millis(1);

/// Computes the expiry fields persisted by a write.
///
/// A deadline relative to now takes precedence over a fixed deadline.
///
/// # Errors
///
/// Returns [`CacheError::InvalidExpirationConfiguration`] if the resolved
/// absolute deadline is not strictly after `now`, if a sliding window or
/// relative deadline is shorter than [`MIN_EXPIRATION_WINDOW`], or if a
/// duration overflows the timestamp range.
pub fn compute_write_expiration(
    now: DateTime<Utc>,
    options: &CacheEntryOptions,
) -> CacheResult<ExpirationInfo> {
    let absolute_expiration = match options.absolute_expiration_relative_to_now {
        Some(relative) => {
            if relative < MIN_EXPIRATION_WINDOW {
                return Err(CacheError::invalid_expiration(format!(
                    "relative absolute expiration {:?} is shorter than {:?}",
                    relative, MIN_EXPIRATION_WINDOW
                )));
            }
            Some(offset(now, relative)?)
        }
        None => options.absolute_expiration,
    };

    if let Some(deadline) = absolute_expiration {
        if deadline <= now {
            return Err(CacheError::invalid_expiration(format!(
                "absolute expiration {} must be after the current time {}",
                deadline.to_rfc3339(),
                now.to_rfc3339()
            )));
        }
    }

    let expires_at = match options.sliding_expiration {
        Some(sliding) => {
            if sliding < MIN_EXPIRATION_WINDOW {
                return Err(CacheError::invalid_expiration(format!(
                    "sliding expiration {:?} is shorter than {:?}",
                    sliding, MIN_EXPIRATION_WINDOW
                )));
            }
            cap(offset(now, sliding)?, absolute_expiration)
        }
        None => absolute_expiration.unwrap_or_else(never_expires),
    };

    Ok(ExpirationInfo {
        expires_at,
        sliding_expiration: options.sliding_expiration,
        absolute_expiration,
    })
}

/// Computes the refreshed deadline for a record that was just read.
///
/// Returns `None` when the record has no sliding window or when the
/// recomputed deadline equals the stored one. Any difference triggers a
/// rewrite; there is no minimum-delta gate.
#[must_use]
pub fn compute_read_refresh(
    now: DateTime<Utc>,
    current_expires_at: DateTime<Utc>,
    sliding_expiration: Option<Duration>,
    absolute_expiration: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    let sliding = sliding_expiration?;
    let candidate = match offset(now, sliding) {
        Ok(candidate) => cap(candidate, absolute_expiration),
        Err(_) => absolute_expiration?,
    };

    (candidate != current_expires_at).then_some(candidate)
}

fn offset(now: DateTime<Utc>, duration: Duration) -> CacheResult<DateTime<Utc>> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| {
            CacheError::invalid_expiration(format!("duration {:?} is out of range", duration))
        })
}

fn cap(candidate: DateTime<Utc>, absolute_expiration: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match absolute_expiration {
        Some(deadline) if candidate > deadline => deadline,
        _ => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    // =========================================================================
    // Write-time expiration
    // =========================================================================

    #[test]
    fn test_absolute_only() {
        let options = CacheEntryOptions::new().with_absolute_expiration(t0() + secs(10));

        let info = compute_write_expiration(t0(), &options).unwrap();

        assert_eq!(info.expires_at, t0() + secs(10));
        assert_eq!(info.absolute_expiration, Some(t0() + secs(10)));
        assert!(info.sliding_expiration.is_none());
    }

    #[test]
    fn test_relative_resolves_against_now() {
        let options = CacheEntryOptions::new()
            .with_absolute_expiration_relative_to_now(Duration::from_secs(10));

        let info = compute_write_expiration(t0(), &options).unwrap();

        assert_eq!(info.expires_at, t0() + secs(10));
        assert_eq!(info.absolute_expiration, Some(t0() + secs(10)));
    }

    #[test]
    fn test_relative_takes_precedence_over_absolute() {
        let options = CacheEntryOptions::new()
            .with_absolute_expiration(t0() + secs(100))
            .with_absolute_expiration_relative_to_now(Duration::from_secs(5));

        let info = compute_write_expiration(t0(), &options).unwrap();

        assert_eq!(info.absolute_expiration, Some(t0() + secs(5)));
    }

    #[test]
    fn test_sliding_only() {
        let options = CacheEntryOptions::new().with_sliding_expiration(Duration::from_secs(2));

        let info = compute_write_expiration(t0(), &options).unwrap();

        assert_eq!(info.expires_at, t0() + secs(2));
        assert_eq!(info.sliding_expiration, Some(Duration::from_secs(2)));
        assert!(info.absolute_expiration.is_none());
    }

    #[test]
    fn test_absolute_caps_sliding() {
        let options = CacheEntryOptions::new()
            .with_sliding_expiration(Duration::from_secs(10))
            .with_absolute_expiration_relative_to_now(Duration::from_secs(3));

        let info = compute_write_expiration(t0(), &options).unwrap();

        assert_eq!(info.expires_at, t0() + secs(3));
        assert_eq!(info.sliding_expiration, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_sliding_shorter_than_absolute() {
        let options = CacheEntryOptions::new()
            .with_sliding_expiration(Duration::from_secs(2))
            .with_absolute_expiration(t0() + secs(60));

        let info = compute_write_expiration(t0(), &options).unwrap();

        assert_eq!(info.expires_at, t0() + secs(2));
    }

    #[test]
    fn test_no_expiration_never_expires() {
        let info = compute_write_expiration(t0(), &CacheEntryOptions::new()).unwrap();

        assert_eq!(info.expires_at, never_expires());
        assert!(info.sliding_expiration.is_none());
        assert!(info.absolute_expiration.is_none());
    }

    #[test]
    fn test_absolute_in_past_is_rejected() {
        let options = CacheEntryOptions::new().with_absolute_expiration(t0() - secs(1));

        let result = compute_write_expiration(t0(), &options);

        assert!(matches!(
            result,
            Err(CacheError::InvalidExpirationConfiguration(_))
        ));
    }

    #[test]
    fn test_absolute_equal_to_now_is_rejected() {
        let options = CacheEntryOptions::new().with_absolute_expiration(t0());

        assert!(compute_write_expiration(t0(), &options).is_err());
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        let zero_sliding = CacheEntryOptions::new().with_sliding_expiration(Duration::ZERO);
        let zero_relative =
            CacheEntryOptions::new().with_absolute_expiration_relative_to_now(Duration::ZERO);

        assert!(compute_write_expiration(t0(), &zero_sliding).is_err());
        assert!(compute_write_expiration(t0(), &zero_relative).is_err());
    }

    #[test]
    fn test_sub_millisecond_windows_are_rejected() {
        let short = Duration::from_micros(500);
        let sliding = CacheEntryOptions::new().with_sliding_expiration(short);
        let relative = CacheEntryOptions::new().with_absolute_expiration_relative_to_now(short);

        assert!(matches!(
            compute_write_expiration(t0(), &sliding),
            Err(CacheError::InvalidExpirationConfiguration(_))
        ));
        assert!(matches!(
            compute_write_expiration(t0(), &relative),
            Err(CacheError::InvalidExpirationConfiguration(_))
        ));

        let shortest = CacheEntryOptions::new().with_sliding_expiration(MIN_EXPIRATION_WINDOW);
        let info = compute_write_expiration(t0(), &shortest).unwrap();
        assert_eq!(info.expires_at, t0() + chrono::Duration::milliseconds(1));
    }

    #[test]
    fn test_overflowing_duration_is_rejected() {
        let options = CacheEntryOptions::new().with_sliding_expiration(Duration::MAX);

        let result = compute_write_expiration(t0(), &options);

        assert!(matches!(
            result,
            Err(CacheError::InvalidExpirationConfiguration(_))
        ));
    }

    // =========================================================================
    // Read-time refresh
    // =========================================================================

    #[test]
    fn test_refresh_without_sliding_is_none() {
        let refreshed = compute_read_refresh(t0(), t0() + secs(10), None, Some(t0() + secs(10)));
        assert!(refreshed.is_none());
    }

    #[test]
    fn test_refresh_extends_sliding() {
        let now = t0() + secs(1);
        let refreshed =
            compute_read_refresh(now, t0() + secs(2), Some(Duration::from_secs(2)), None);

        assert_eq!(refreshed, Some(t0() + secs(3)));
    }

    #[test]
    fn test_refresh_is_capped_by_absolute() {
        let now = t0() + secs(2);
        let refreshed = compute_read_refresh(
            now,
            t0() + secs(3),
            Some(Duration::from_secs(10)),
            Some(t0() + secs(3)),
        );

        // Already at the cap: nothing to write.
        assert!(refreshed.is_none());
    }

    #[test]
    fn test_refresh_moves_up_to_cap() {
        let now = t0() + secs(4);
        let refreshed = compute_read_refresh(
            now,
            t0() + secs(5),
            Some(Duration::from_secs(2)),
            Some(t0() + secs(5)),
        );

        assert!(refreshed.is_none());

        let refreshed = compute_read_refresh(
            t0() + secs(1),
            t0() + secs(2),
            Some(Duration::from_secs(2)),
            Some(t0() + secs(5)),
        );
        assert_eq!(refreshed, Some(t0() + secs(3)));
    }

    #[test]
    fn test_refresh_skipped_when_unchanged() {
        let refreshed =
            compute_read_refresh(t0(), t0() + secs(2), Some(Duration::from_secs(2)), None);
        assert!(refreshed.is_none());
    }

    #[test]
    fn test_refresh_never_exceeds_absolute_across_reads() {
        let absolute = t0() + secs(3);
        let sliding = Some(Duration::from_secs(10));
        let mut expires_at = compute_write_expiration(
            t0(),
            &CacheEntryOptions::new()
                .with_sliding_expiration(Duration::from_secs(10))
                .with_absolute_expiration(absolute),
        )
        .unwrap()
        .expires_at;

        for step in 0..3 {
            let now = t0() + chrono::Duration::milliseconds(step * 900);
            if let Some(next) = compute_read_refresh(now, expires_at, sliding, Some(absolute)) {
                expires_at = next;
            }
            assert!(expires_at <= absolute);
        }
    }
}
