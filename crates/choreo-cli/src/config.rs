use anyhow::Result;
use chrono::{DateTime, Utc};
use choreo_core::recurrence::{ExpandOptions, MonthOverflow};
use choreo_core::timezone::validate_timezone;
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "choreo.toml";

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Whose document to read and write
    pub user_id: String,
    /// Directory holding one JSON document per user
    pub data_dir: PathBuf,
    /// trace|debug|info|warn|error
    pub log_level: String,
    pub calendar: CalendarConfig,
}

/// How occurrences are expanded for display
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct CalendarConfig {
    /// User's timezone (IANA format)
    pub timezone: String,
    /// How far past today occurrences are generated
    pub horizon_months: u32,
    /// Safety cap on occurrences per task
    pub max_occurrences: usize,
    /// clamp|spill
    pub month_overflow: MonthOverflow,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            data_dir: PathBuf::from("choreo-data"),
            log_level: "warn".to_string(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: detect_system_timezone(),
            horizon_months: ExpandOptions::DEFAULT_HORIZON_MONTHS,
            max_occurrences: ExpandOptions::DEFAULT_MAX_OCCURRENCES,
            month_overflow: MonthOverflow::default(),
        }
    }
}

impl Config {
    /// Defaults, then `choreo.toml` (or the file named by `CHOREO_CONFIG`),
    /// then `CHOREO_*` environment variables. Nested keys use `__`, as in
    /// `CHOREO_CALENDAR__TIMEZONE`.
    pub fn new() -> Result<Self, figment::Error> {
        let file = std::env::var("CHOREO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("CHOREO_").ignore(&["config"]).split("__"))
            .extract()
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(validate_timezone(&self.calendar.timezone)?)
    }

    /// Expansion settings for a render happening at `now`.
    pub fn expand_options(&self, now: DateTime<Utc>) -> Result<ExpandOptions> {
        Ok(ExpandOptions::rolling(now, self.calendar.horizon_months)
            .with_timezone(self.timezone()?)
            .with_max_occurrences(self.calendar.max_occurrences)
            .with_month_overflow(self.calendar.month_overflow))
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if !tz.is_empty() && validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    "UTC".to_string()
}
