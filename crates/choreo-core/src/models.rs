use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;
use uuid::Uuid;

/// Section every task falls back to when its own section is missing or removed.
pub const DEFAULT_SECTION: &str = "Other";

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

/// Repeat rule of a task.
///
/// Parsing never fails: values the expander has no rule for (including
/// `custom`, which the UI offers but nothing implements) are kept verbatim so
/// a document round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, SerializeDisplay, DeserializeFromStr)]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Weekdays,
    Custom,
    Other(String),
}

impl Repeat {
    /// Whether the rule produces more than the anchor occurrence.
    pub fn advances(&self) -> bool {
        matches!(
            self,
            Repeat::Daily | Repeat::Weekly | Repeat::Monthly | Repeat::Yearly | Repeat::Weekdays
        )
    }
}

impl std::fmt::Display for Repeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repeat::None => write!(f, "none"),
            Repeat::Daily => write!(f, "daily"),
            Repeat::Weekly => write!(f, "weekly"),
            Repeat::Monthly => write!(f, "monthly"),
            Repeat::Yearly => write!(f, "yearly"),
            Repeat::Weekdays => write!(f, "weekdays"),
            Repeat::Custom => write!(f, "custom"),
            Repeat::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl FromStr for Repeat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "" | "none" => Repeat::None,
            "daily" => Repeat::Daily,
            "weekly" => Repeat::Weekly,
            "monthly" => Repeat::Monthly,
            "yearly" => Repeat::Yearly,
            "weekdays" => Repeat::Weekdays,
            "custom" => Repeat::Custom,
            _ => Repeat::Other(s.to_string()),
        })
    }
}

/// Formats an occurrence instant the way override sets store it:
/// UTC, millisecond precision, `Z` suffix (`2024-01-15T09:00:00.000Z`).
pub fn canonical_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Occurrences are identified at millisecond precision, the precision of
/// [`canonical_timestamp`]. Finer digits are dropped.
pub fn occurrence_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(3)
}

/// Parses a stored timestamp, truncated to millisecond precision.
///
/// Accepts RFC 3339 with any offset, and naive `YYYY-MM-DDTHH:MM[:SS[.fff]]`
/// values which are read as UTC. Blank or unparseable input yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(occurrence_instant(dt.with_timezone(&Utc)));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| occurrence_instant(naive.and_utc()))
}

/// Whether an override entry denotes the occurrence at `instant`. The one
/// membership rule for `doneDates` and `deletedDates`.
pub(crate) fn override_matches(raw: &str, instant: DateTime<Utc>) -> bool {
    parse_timestamp(raw) == Some(occurrence_instant(instant))
}

fn set_contains(set: &BTreeSet<String>, instant: DateTime<Utc>) -> bool {
    set.iter().any(|raw| override_matches(raw, instant))
}

fn set_remove(set: &mut BTreeSet<String>, instant: DateTime<Utc>) -> bool {
    let before = set.len();
    set.retain(|raw| !override_matches(raw, instant));
    set.len() != before
}

/// A chore as persisted in the user's document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(alias = "title")]
    pub name: String,
    /// Anchor of the series, kept exactly as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub done_dates: BTreeSet<String>,
    #[serde(default)]
    pub deleted_dates: BTreeSet<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, anchor: Option<DateTime<Utc>>, repeat: Repeat) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date_time: anchor.map(canonical_timestamp),
            repeat,
            section: default_section(),
            description: None,
            done_dates: BTreeSet::new(),
            deleted_dates: BTreeSet::new(),
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The first occurrence, or `None` when `dateTime` is missing, blank or unparseable.
    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.date_time.as_deref().and_then(parse_timestamp)
    }

    pub fn is_done_at(&self, instant: DateTime<Utc>) -> bool {
        set_contains(&self.done_dates, instant)
    }

    pub fn is_deleted_at(&self, instant: DateTime<Utc>) -> bool {
        set_contains(&self.deleted_dates, instant)
    }

    /// Marks or unmarks one occurrence as done. Returns whether anything changed.
    pub fn set_done(&mut self, instant: DateTime<Utc>, done: bool) -> bool {
        if done {
            if self.is_done_at(instant) {
                return false;
            }
            self.done_dates.insert(canonical_timestamp(instant))
        } else {
            set_remove(&mut self.done_dates, instant)
        }
    }

    /// Flips the done state of one occurrence and returns the new state.
    pub fn toggle_done(&mut self, instant: DateTime<Utc>) -> bool {
        let done = !self.is_done_at(instant);
        self.set_done(instant, done);
        done
    }

    /// Removes a single occurrence from the series. Idempotent.
    pub fn delete_occurrence(&mut self, instant: DateTime<Utc>) -> bool {
        if self.is_deleted_at(instant) {
            return false;
        }
        self.deleted_dates.insert(canonical_timestamp(instant))
    }

    /// Undoes [`Task::delete_occurrence`].
    pub fn restore_occurrence(&mut self, instant: DateTime<Utc>) -> bool {
        set_remove(&mut self.deleted_dates, instant)
    }

    /// Drops override entries older than `cutoff`, along with entries that do
    /// not parse. Returns how many entries were removed.
    pub fn compact_overrides(&mut self, cutoff: DateTime<Utc>) -> usize {
        let keep = |raw: &String| matches!(parse_timestamp(raw), Some(t) if t >= cutoff);
        let before = self.done_dates.len() + self.deleted_dates.len();
        self.done_dates.retain(keep);
        self.deleted_dates.retain(keep);
        before - (self.done_dates.len() + self.deleted_dates.len())
    }
}

/// The per-user document held by a task store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub chores: Vec<Task>,
    #[serde(default)]
    pub sections: Vec<String>,
}

/// Display state of one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceStatus {
    Pending,
    Done,
    Overdue,
}

impl std::fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccurrenceStatus::Pending => write!(f, "pending"),
            OccurrenceStatus::Done => write!(f, "done"),
            OccurrenceStatus::Overdue => write!(f, "overdue"),
        }
    }
}

/// One concrete calendar instance of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub task_id: Uuid,
    pub title: String,
    pub occurs_at: DateTime<Utc>,
    /// Canonical key of this occurrence in the override sets
    pub timestamp: String,
    pub is_done: bool,
    pub is_overdue: bool,
    pub section: String,
    pub description: Option<String>,
}

impl Occurrence {
    pub fn status(&self) -> OccurrenceStatus {
        if self.is_done {
            OccurrenceStatus::Done
        } else if self.is_overdue {
            OccurrenceStatus::Overdue
        } else {
            OccurrenceStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub date_time: Option<DateTime<Utc>>,
    pub repeat: Repeat,
    pub section: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub date_time: Option<Option<DateTime<Utc>>>,
    pub repeat: Option<Repeat>,
    pub section: Option<String>,
    pub description: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    mod repeat_tests {
        use super::*;

        #[rstest]
        #[case("none", Repeat::None)]
        #[case("", Repeat::None)]
        #[case("Daily", Repeat::Daily)]
        #[case("WEEKLY", Repeat::Weekly)]
        #[case("monthly", Repeat::Monthly)]
        #[case("yearly", Repeat::Yearly)]
        #[case("weekdays", Repeat::Weekdays)]
        #[case("custom", Repeat::Custom)]
        #[case("fortnightly", Repeat::Other("fortnightly".to_string()))]
        fn test_from_str(#[case] input: &str, #[case] expected: Repeat) {
            assert_eq!(input.parse::<Repeat>().unwrap(), expected);
        }

        #[test]
        fn test_advances() {
            assert!(Repeat::Daily.advances());
            assert!(Repeat::Weekdays.advances());
            assert!(!Repeat::None.advances());
            assert!(!Repeat::Custom.advances());
            assert!(!Repeat::Other("x".to_string()).advances());
        }

        #[test]
        fn test_unknown_value_round_trips() {
            let json = serde_json::to_string(&Repeat::Other("biweekly".to_string())).unwrap();
            assert_eq!(json, "\"biweekly\"");
            let back: Repeat = serde_json::from_str(&json).unwrap();
            assert_eq!(back, Repeat::Other("biweekly".to_string()));
        }
    }

    mod timestamp_tests {
        use super::*;

        #[test]
        fn test_canonical_format() {
            assert_eq!(canonical_timestamp(at(2024, 1, 15, 9)), "2024-01-15T09:00:00.000Z");
        }

        #[rstest]
        #[case("2024-01-15T09:00:00Z")]
        #[case("2024-01-15T09:00:00.000Z")]
        #[case("2024-01-15T10:00:00+01:00")]
        #[case("2024-01-15T09:00")]
        #[case("2024-01-15T09:00:00")]
        fn test_parse_variants(#[case] raw: &str) {
            assert_eq!(parse_timestamp(raw), Some(at(2024, 1, 15, 9)));
        }

        #[test]
        fn test_parse_truncates_to_millis() {
            let parsed = parse_timestamp("2024-01-01T09:00:00.123456Z").unwrap();
            assert_eq!(canonical_timestamp(parsed), "2024-01-01T09:00:00.123Z");
            assert_eq!(parse_timestamp("2024-01-01T09:00:00.123Z"), Some(parsed));
        }

        #[rstest]
        #[case("")]
        #[case("   ")]
        #[case("next tuesday")]
        #[case("2024-13-40T99:00:00Z")]
        fn test_parse_rejects(#[case] raw: &str) {
            assert_eq!(parse_timestamp(raw), None);
        }
    }

    mod task_tests {
        use super::*;

        #[test]
        fn test_document_shape() {
            let json = r#"{
                "title": "Water plants",
                "dateTime": "2024-01-01T09:00:00.000Z",
                "repeat": "weekly",
                "doneDates": ["2024-01-08T09:00:00.000Z"]
            }"#;
            let task: Task = serde_json::from_str(json).unwrap();
            assert_eq!(task.name, "Water plants");
            assert_eq!(task.repeat, Repeat::Weekly);
            assert_eq!(task.section, DEFAULT_SECTION);
            assert!(task.deleted_dates.is_empty());
            assert_eq!(task.anchor(), Some(at(2024, 1, 1, 9)));

            let value = serde_json::to_value(&task).unwrap();
            assert!(value.get("dateTime").is_some());
            assert!(value.get("doneDates").is_some());
            assert!(value.get("deletedDates").is_some());
        }

        #[test]
        fn test_missing_anchor() {
            let mut task = Task::new("Floating", None, Repeat::Daily);
            assert_eq!(task.anchor(), None);
            task.date_time = Some("".to_string());
            assert_eq!(task.anchor(), None);
        }

        #[test]
        fn test_override_matching_by_instant() {
            let mut task = Task::new("Trash", Some(at(2024, 1, 1, 9)), Repeat::Weekly);
            task.done_dates.insert("2024-01-08T09:00:00Z".to_string());
            assert!(task.is_done_at(at(2024, 1, 8, 9)));
            assert!(!task.is_done_at(at(2024, 1, 15, 9)));
        }

        #[test]
        fn test_sub_millisecond_instants_share_one_mark() {
            let instant = DateTime::parse_from_rfc3339("2024-01-01T09:00:00.123456Z")
                .unwrap()
                .with_timezone(&Utc);
            let mut task = Task::new("Feed cat", Some(instant), Repeat::Daily);
            assert!(task.toggle_done(instant));
            assert!(task.done_dates.contains("2024-01-01T09:00:00.123Z"));
            assert!(task.is_done_at(instant));
            assert!(task.is_done_at(occurrence_instant(instant)));
            assert!(task.delete_occurrence(instant));
            assert!(task.is_deleted_at(instant));
        }

        #[test]
        fn test_toggle_done() {
            let mut task = Task::new("Trash", Some(at(2024, 1, 1, 9)), Repeat::Weekly);
            assert!(task.toggle_done(at(2024, 1, 8, 9)));
            assert!(task.done_dates.contains("2024-01-08T09:00:00.000Z"));
            assert!(!task.toggle_done(at(2024, 1, 8, 9)));
            assert!(task.done_dates.is_empty());
        }

        #[test]
        fn test_unset_done_removes_equivalent_entries() {
            let mut task = Task::new("Trash", Some(at(2024, 1, 1, 9)), Repeat::Weekly);
            task.done_dates.insert("2024-01-08T09:00:00Z".to_string());
            task.done_dates.insert("2024-01-08T09:00:00.000Z".to_string());
            assert!(task.set_done(at(2024, 1, 8, 9), false));
            assert!(task.done_dates.is_empty());
        }

        #[test]
        fn test_delete_and_restore_occurrence() {
            let mut task = Task::new("Laundry", Some(at(2024, 1, 1, 9)), Repeat::Daily);
            assert!(task.delete_occurrence(at(2024, 1, 3, 9)));
            assert!(!task.delete_occurrence(at(2024, 1, 3, 9)));
            assert_eq!(task.deleted_dates.len(), 1);
            assert!(task.is_deleted_at(at(2024, 1, 3, 9)));
            assert!(task.restore_occurrence(at(2024, 1, 3, 9)));
            assert!(!task.is_deleted_at(at(2024, 1, 3, 9)));
        }

        #[test]
        fn test_overrides_leave_series_fields_alone() {
            let mut task = Task::new("Laundry", Some(at(2024, 1, 1, 9)), Repeat::Daily);
            let original = task.clone();
            task.toggle_done(at(2024, 1, 2, 9));
            task.delete_occurrence(at(2024, 1, 3, 9));
            assert_eq!(task.date_time, original.date_time);
            assert_eq!(task.repeat, original.repeat);
            assert_eq!(task.name, original.name);
        }

        #[test]
        fn test_compact_overrides() {
            let mut task = Task::new("Laundry", Some(at(2024, 1, 1, 9)), Repeat::Daily);
            task.set_done(at(2024, 1, 1, 9), true);
            task.set_done(at(2024, 3, 1, 9), true);
            task.delete_occurrence(at(2024, 1, 2, 9));
            task.deleted_dates.insert("garbage".to_string());

            let removed = task.compact_overrides(at(2024, 2, 1, 0));
            assert_eq!(removed, 3);
            assert_eq!(task.done_dates.len(), 1);
            assert!(task.deleted_dates.is_empty());
        }
    }

    #[test]
    fn test_occurrence_status() {
        let mut occurrence = Occurrence {
            task_id: Uuid::new_v4(),
            title: "x".to_string(),
            occurs_at: at(2024, 1, 1, 9),
            timestamp: canonical_timestamp(at(2024, 1, 1, 9)),
            is_done: false,
            is_overdue: false,
            section: DEFAULT_SECTION.to_string(),
            description: None,
        };
        assert_eq!(occurrence.status(), OccurrenceStatus::Pending);
        occurrence.is_overdue = true;
        assert_eq!(occurrence.status(), OccurrenceStatus::Overdue);
        occurrence.is_done = true;
        assert_eq!(occurrence.status(), OccurrenceStatus::Done);
    }
}
