use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use choreo_core::agenda::{summarize, AgendaFilter};
use choreo_core::book::ChoreBook;
use choreo_core::store::TaskStore;
use owo_colors::OwoColorize;

use crate::cli::CalendarCommand;
use crate::config::Config;
use crate::parser::parse_date;
use crate::views::table::{display_checklist, display_occurrences, display_summary};

pub async fn show_calendar(
    book: &ChoreBook<impl TaskStore>,
    command: CalendarCommand,
    config: &Config,
) -> Result<()> {
    let now = Utc::now();
    let mut options = config.expand_options(now)?;
    if let Some(days) = command.days {
        options.horizon_end = now
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| anyhow!("--days {} reaches past the last representable date", days))?;
    }

    let filter = AgendaFilter {
        section: command.section,
        date: command
            .date
            .as_deref()
            .map(|d| parse_date(d, &options.timezone, now))
            .transpose()?,
    };
    let occurrences = book.calendar(&options, now, &filter).await?;

    display_occurrences(&occurrences, &options.timezone, now);
    if !occurrences.is_empty() {
        display_summary(&summarize(&occurrences));
    }
    Ok(())
}

pub async fn show_today(book: &ChoreBook<impl TaskStore>, config: &Config) -> Result<()> {
    let now = Utc::now();
    let options = config.expand_options(now)?;
    let occurrences = book.today(&options, now).await?;

    println!(
        "{}",
        now.with_timezone(&options.timezone)
            .format("%A, %B %-d")
            .to_string()
            .bold()
    );
    display_checklist(&occurrences, &options.timezone);
    if !occurrences.is_empty() {
        display_summary(&summarize(&occurrences));
    }
    Ok(())
}
