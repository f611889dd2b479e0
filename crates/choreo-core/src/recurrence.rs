//! Occurrence expansion.
//!
//! A task's occurrences are a pure function of its anchor, its repeat rule,
//! its override sets and the [`ExpandOptions`] in effect. Nothing is cached:
//! callers re-run [`expand`] whenever they render.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{
    canonical_timestamp, occurrence_instant, parse_timestamp, Occurrence, Repeat, Task,
};
use crate::timezone::resolve_local;

/// How monthly and yearly rules treat an anchor day that the target month lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthOverflow {
    /// Use the last day of the target month. Each occurrence is computed from
    /// the anchor, so Jan 31 gives Feb 29, Mar 31, Apr 30.
    #[default]
    Clamp,
    /// Let the excess days spill into the following month, carried forward
    /// from the previous occurrence, so Jan 31 gives Mar 2, Apr 2, May 2.
    Spill,
}

impl std::str::FromStr for MonthOverflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clamp" => Ok(MonthOverflow::Clamp),
            "spill" => Ok(MonthOverflow::Spill),
            _ => Err(format!("Invalid month overflow policy: {}", s)),
        }
    }
}

/// Bounds and calendar settings for one expansion.
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// Exclusive upper bound for generated occurrences
    pub horizon_end: DateTime<Utc>,
    /// Hard cap on iterations, deleted occurrences included
    pub max_occurrences: usize,
    /// Calendar used for day arithmetic, weekends and "today"
    pub timezone: Tz,
    pub month_overflow: MonthOverflow,
}

impl ExpandOptions {
    pub const DEFAULT_MAX_OCCURRENCES: usize = 500;
    pub const DEFAULT_HORIZON_MONTHS: u32 = 6;

    pub fn new(horizon_end: DateTime<Utc>) -> Self {
        Self {
            horizon_end,
            max_occurrences: Self::DEFAULT_MAX_OCCURRENCES,
            timezone: Tz::UTC,
            month_overflow: MonthOverflow::default(),
        }
    }

    /// A horizon of `months` calendar months past `now`.
    pub fn rolling(now: DateTime<Utc>, months: u32) -> Self {
        let horizon_end = now
            .checked_add_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(horizon_end)
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_max_occurrences(mut self, max_occurrences: usize) -> Self {
        self.max_occurrences = max_occurrences;
        self
    }

    pub fn with_month_overflow(mut self, month_overflow: MonthOverflow) -> Self {
        self.month_overflow = month_overflow;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Once,
    Days(u64),
    Weekdays,
    Months(u32),
}

impl From<&Repeat> for Step {
    fn from(repeat: &Repeat) -> Self {
        match repeat {
            Repeat::Daily => Step::Days(1),
            Repeat::Weekly => Step::Days(7),
            Repeat::Weekdays => Step::Weekdays,
            Repeat::Monthly => Step::Months(1),
            Repeat::Yearly => Step::Months(12),
            Repeat::None | Repeat::Custom | Repeat::Other(_) => Step::Once,
        }
    }
}

/// Unbounded, strictly increasing sequence of a task's occurrence instants.
///
/// Arithmetic runs on local wall-clock time in the expansion timezone, so a
/// daily 09:00 chore stays at 09:00 across DST changes. The first item is
/// always the anchor itself, truncated to milliseconds. A wall-clock step that
/// resolves to an instant at or before the previous one (a skipped local day)
/// is dropped.
#[derive(Debug, Clone)]
pub struct Schedule {
    step: Step,
    overflow: MonthOverflow,
    timezone: Tz,
    anchor: DateTime<Utc>,
    anchor_local: NaiveDateTime,
    cursor: Option<NaiveDateTime>,
    index: u32,
    last: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new(anchor: DateTime<Utc>, repeat: &Repeat, options: &ExpandOptions) -> Self {
        let anchor = occurrence_instant(anchor);
        let anchor_local = anchor.with_timezone(&options.timezone).naive_local();
        Self {
            step: Step::from(repeat),
            overflow: options.month_overflow,
            timezone: options.timezone,
            anchor,
            anchor_local,
            cursor: Some(anchor_local),
            index: 0,
            last: None,
        }
    }

    fn advance(&self, current: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.step {
            Step::Once => None,
            Step::Days(n) => current.checked_add_days(Days::new(n)),
            Step::Weekdays => {
                let mut next = current.checked_add_days(Days::new(1))?;
                while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
                    next = next.checked_add_days(Days::new(1))?;
                }
                Some(next)
            }
            Step::Months(n) => match self.overflow {
                MonthOverflow::Clamp => self
                    .anchor_local
                    .checked_add_months(Months::new(n.checked_mul(self.index)?)),
                MonthOverflow::Spill => add_months_spilling(current, n),
            },
        }
    }
}

impl Iterator for Schedule {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.cursor?;
            let instant = if self.index == 0 {
                self.anchor
            } else {
                resolve_local(&self.timezone, current)
            };
            self.index = self.index.checked_add(1)?;
            self.cursor = self.advance(current);
            if self.last.is_some_and(|last| instant <= last) {
                continue;
            }
            self.last = Some(instant);
            return Some(instant);
        }
    }
}

/// Adds months the way a spilling date library does: a day past the end of
/// the target month carries into the month after it.
fn add_months_spilling(current: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    let zero_based = current.month0() + months;
    let year = current.year().checked_add(i32::try_from(zero_based / 12).ok()?)?;
    let month = zero_based % 12 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first.checked_add_days(Days::new(u64::from(current.day() - 1)))?;
    Some(date.and_time(current.time()))
}

/// Override sets parsed once per expansion for O(1) lookup.
struct Overrides {
    done: HashSet<DateTime<Utc>>,
    deleted: HashSet<DateTime<Utc>>,
}

impl Overrides {
    fn from_task(task: &Task) -> Self {
        let parse = |field: &str, raw: &String| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                warn!(
                    "event=override_ignored module=recurrence task={} field={} value={:?}",
                    task.id, field, raw
                );
            }
            parsed
        };
        Self {
            done: task
                .done_dates
                .iter()
                .filter_map(|raw| parse("doneDates", raw))
                .collect(),
            deleted: task
                .deleted_dates
                .iter()
                .filter_map(|raw| parse("deletedDates", raw))
                .collect(),
        }
    }

    fn is_done(&self, instant: DateTime<Utc>) -> bool {
        self.done.contains(&occurrence_instant(instant))
    }

    fn is_deleted(&self, instant: DateTime<Utc>) -> bool {
        self.deleted.contains(&occurrence_instant(instant))
    }
}

/// Expands one task into its concrete occurrences.
///
/// Generation starts at the anchor and stops at `options.horizon_end`
/// (exclusive) or after `options.max_occurrences` iterations, whichever comes
/// first. Occurrences listed in `deletedDates` are skipped without ending the
/// series. A task without a parseable anchor has no occurrences; this is not
/// an error.
///
/// `now` decides which undone occurrences are overdue.
pub fn expand(task: &Task, options: &ExpandOptions, now: DateTime<Utc>) -> Vec<Occurrence> {
    let Some(anchor) = task.anchor() else {
        debug!(
            "event=expand_skipped module=recurrence task={} reason=no_anchor date_time={:?}",
            task.id, task.date_time
        );
        return Vec::new();
    };

    let overrides = Overrides::from_task(task);
    let mut occurrences = Vec::new();
    let mut iterations = 0usize;

    for occurs_at in Schedule::new(anchor, &task.repeat, options) {
        if occurs_at >= options.horizon_end {
            break;
        }
        if iterations >= options.max_occurrences {
            debug!(
                "event=expand_truncated module=recurrence task={} cap={}",
                task.id, options.max_occurrences
            );
            break;
        }
        iterations += 1;

        if overrides.is_deleted(occurs_at) {
            continue;
        }
        let is_done = overrides.is_done(occurs_at);
        occurrences.push(Occurrence {
            task_id: task.id,
            title: task.name.clone(),
            occurs_at,
            timestamp: canonical_timestamp(occurs_at),
            is_done,
            is_overdue: occurs_at < now && !is_done,
            section: task.section.clone(),
            description: task.description.clone(),
        });
    }

    occurrences
}

/// First non-deleted occurrence strictly after `after`.
///
/// Ignores the horizon but still honors `max_occurrences`.
pub fn next_occurrence_after(
    task: &Task,
    after: DateTime<Utc>,
    options: &ExpandOptions,
) -> Option<DateTime<Utc>> {
    let anchor = task.anchor()?;
    let overrides = Overrides::from_task(task);
    Schedule::new(anchor, &task.repeat, options)
        .take(options.max_occurrences)
        .filter(|t| !overrides.is_deleted(*t))
        .find(|t| *t > after)
}

/// Whether `instant` is one of the task's occurrence instants, deleted or not.
pub fn is_occurrence(task: &Task, instant: DateTime<Utc>, options: &ExpandOptions) -> bool {
    let Some(anchor) = task.anchor() else {
        return false;
    };
    let instant = occurrence_instant(instant);
    Schedule::new(anchor, &task.repeat, options)
        .take(options.max_occurrences)
        .take_while(|t| *t <= instant)
        .any(|t| t == instant)
}
