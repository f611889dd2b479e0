use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use choreo_core::timezone::resolve_local;

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a user-supplied instant.
///
/// Timestamps with an offset (`2024-01-15T09:00:00.000Z`) are taken as-is.
/// Wall-clock forms without an offset, and natural language such as
/// `tomorrow 8am`, are read in `tz`.
pub fn parse_when(input: &str, tz: &Tz, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(naive) = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Ok(resolve_local(tz, naive));
    }
    parse_date_string(input, now.with_timezone(tz), Dialect::Us)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parses a local calendar date: `YYYY-MM-DD` or anything [`parse_when`]
/// understands.
pub fn parse_date(input: &str, tz: &Tz, now: DateTime<Utc>) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    Ok(parse_when(input, tz, now)?.with_timezone(tz).date_naive())
}

/// Only a bare `YYYY-MM-DD` counts as a date here.
pub fn parse_plain_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}
