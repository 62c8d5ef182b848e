//! UTC to local time conversion.
//!
//! Date/time fields travel as UTC instants. These helpers shift them into
//! the calling user's configured time zone for display.

use crate::error::Result;
use chrono::{DateTime, FixedOffset, Utc};

/// Supplies the UTC offset configured for the calling user.
pub trait TimeZoneSource {
    /// Returns `Ok(None)` when the user has no time zone configured.
    fn current_user_offset(&self) -> Result<Option<FixedOffset>>;
}

/// Shift a UTC instant into a fixed offset.
pub fn to_local_time(utc: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    utc.with_timezone(&offset)
}

/// Shift a UTC instant into the calling user's time zone.
pub fn local_time_for_current_user(
    source: &dyn TimeZoneSource,
    utc: DateTime<Utc>,
) -> Result<Option<DateTime<FixedOffset>>> {
    let Some(offset) = source.current_user_offset()? else {
        tracing::debug!("no time zone configured for current user");
        return Ok(None);
    };
    Ok(Some(to_local_time(utc, offset)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryStore;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_to_local_time_keeps_instant() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();

        let local = to_local_time(utc, offset);
        assert_eq!(local.hour(), 12);
        assert_eq!(local.with_timezone(&Utc), utc);
    }

    #[test]
    fn test_current_user_without_time_zone() {
        let store = InMemoryStore::new();
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(local_time_for_current_user(&store, utc).unwrap().is_none());

        store.set_user_offset(FixedOffset::west_opt(5 * 3600));
        let local = local_time_for_current_user(&store, utc).unwrap().unwrap();
        assert_eq!(local.hour(), 19);
    }
}
