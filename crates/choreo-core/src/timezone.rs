use crate::error::CoreError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate an IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone.trim()).map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// Calendar date of `instant` as seen in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Maps a local wall-clock time back to UTC.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// fall in a gap are read with the offset in force before the transition, so
/// they move forward by the length of the gap: 02:30 on a spring-forward night
/// becomes 03:30, and a wall time on a skipped day lands on the day after.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    if let Some(resolved) = tz.from_local_datetime(&local).earliest() {
        return resolved.with_timezone(&Utc);
    }
    let earlier = local.checked_sub_signed(Duration::days(1)).unwrap_or(local);
    let offset = tz.offset_from_utc_datetime(&earlier).fix();
    local
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .unwrap_or(local)
        .and_utc()
}

/// Start of the local calendar day `date` in `tz`, as a UTC instant.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    resolve_local(tz, date.and_time(chrono::NaiveTime::MIN))
}

/// Format a UTC instant in the given timezone
pub fn format_local(instant: DateTime<Utc>, tz: &Tz, format: &str) -> String {
    instant.with_timezone(tz).format(format).to_string()
}
