use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use choreo_core::book::ChoreBook;
use choreo_core::error::CoreError;
use choreo_core::models::{canonical_timestamp, Task};
use choreo_core::recurrence::{ExpandOptions, Schedule};
use choreo_core::store::TaskStore;
use choreo_core::timezone::local_date;

use crate::parser::{parse_plain_date, parse_when};

/// Turns the occurrence argument of `done`/`skip`/`restore` into an instant.
///
/// A bare local date picks the task's occurrence on that day, provided there
/// is exactly one. Anything else is parsed as an instant.
pub async fn resolve_occurrence(
    book: &ChoreBook<impl TaskStore>,
    id: &str,
    input: &str,
    options: &ExpandOptions,
    now: DateTime<Utc>,
) -> Result<(Task, DateTime<Utc>)> {
    let task = book.find(id).await?;
    let Some(date) = parse_plain_date(input) else {
        let instant = parse_when(input, &options.timezone, now)?;
        return Ok((task, instant));
    };

    let Some(anchor) = task.anchor() else {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "'{}' has no date, so it has no occurrences",
            task.name
        ))));
    };
    let matches: Vec<DateTime<Utc>> = Schedule::new(anchor, &task.repeat, options)
        .take(options.max_occurrences)
        .take_while(|t| local_date(*t, &options.timezone) <= date)
        .filter(|t| local_date(*t, &options.timezone) == date)
        .collect();

    match matches.as_slice() {
        [instant] => Ok((task, *instant)),
        [] => Err(anyhow!(CoreError::InvalidInput(format!(
            "'{}' has no occurrence on {}",
            task.name, date
        )))),
        many => Err(anyhow!(CoreError::InvalidInput(format!(
            "'{}' occurs {} times on {}; pass one of: {}",
            task.name,
            many.len(),
            date,
            many.iter()
                .map(|t| canonical_timestamp(*t))
                .collect::<Vec<_>>()
                .join(", ")
        )))),
    }
}

/// First seven characters of the task id, as shown in tables.
pub fn short_id(task_id: &impl std::fmt::Display) -> String {
    task_id.to_string().chars().take(7).collect()
}
