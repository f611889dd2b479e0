//! Cross-task views built on [`expand`]: the calendar event list and the
//! today checklist. Both go through the same expansion, so an occurrence is
//! classified identically wherever it is shown.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Occurrence, OccurrenceStatus, Task};
use crate::recurrence::{expand, ExpandOptions};
use crate::timezone::local_date;

/// Narrows a merged event list. Empty filter keeps everything.
#[derive(Debug, Clone, Default)]
pub struct AgendaFilter {
    pub section: Option<String>,
    /// Local calendar date in the expansion timezone
    pub date: Option<NaiveDate>,
}

impl AgendaFilter {
    pub fn section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..Default::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    fn matches(&self, occurrence: &Occurrence, options: &ExpandOptions) -> bool {
        if let Some(section) = &self.section {
            if occurrence.section != *section {
                return false;
            }
        }
        if let Some(date) = self.date {
            if local_date(occurrence.occurs_at, &options.timezone) != date {
                return false;
            }
        }
        true
    }
}

/// Expands every task, keeps what passes `filter`, and sorts by occurrence
/// time. The sort is stable: simultaneous occurrences keep task order.
pub fn expand_all(
    tasks: &[Task],
    options: &ExpandOptions,
    now: DateTime<Utc>,
    filter: &AgendaFilter,
) -> Vec<Occurrence> {
    let mut events: Vec<Occurrence> = tasks
        .iter()
        .flat_map(|task| expand(task, options, now))
        .filter(|occurrence| filter.matches(occurrence, options))
        .collect();
    events.sort_by_key(|occurrence| occurrence.occurs_at);
    events
}

/// Occurrences falling on the local calendar day of `now`, earliest first.
pub fn today(tasks: &[Task], options: &ExpandOptions, now: DateTime<Utc>) -> Vec<Occurrence> {
    let filter = AgendaFilter::on(local_date(now, &options.timezone));
    expand_all(tasks, options, now, &filter)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgendaSummary {
    pub total: usize,
    pub done: usize,
    pub overdue: usize,
    pub pending: usize,
}

pub fn summarize(occurrences: &[Occurrence]) -> AgendaSummary {
    occurrences
        .iter()
        .fold(AgendaSummary::default(), |mut summary, occurrence| {
            summary.total += 1;
            match occurrence.status() {
                OccurrenceStatus::Done => summary.done += 1,
                OccurrenceStatus::Overdue => summary.overdue += 1,
                OccurrenceStatus::Pending => summary.pending += 1,
            }
            summary
        })
}
