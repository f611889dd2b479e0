use anyhow::{anyhow, Result};
use chrono::{Months, Utc};
use choreo_core::book::ChoreBook;
use choreo_core::models::canonical_timestamp;
use choreo_core::store::TaskStore;
use choreo_core::timezone::start_of_day;
use owo_colors::{OwoColorize, Style};

use crate::cli::CompactCommand;
use crate::config::Config;
use crate::parser::{parse_plain_date, parse_when};

pub async fn compact(
    book: &ChoreBook<impl TaskStore>,
    command: CompactCommand,
    config: &Config,
) -> Result<()> {
    let now = Utc::now();
    let cutoff = match command.before.as_deref() {
        Some(before) => {
            let tz = config.timezone()?;
            match parse_plain_date(before) {
                Some(date) => start_of_day(date, &tz),
                None => parse_when(before, &tz, now)?,
            }
        }
        None => now
            .checked_sub_months(Months::new(config.calendar.horizon_months))
            .ok_or_else(|| anyhow!("horizon_months is out of range"))?,
    };

    let removed = book.compact(cutoff).await?;
    println!(
        "{} Removed {} mark(s) older than {}",
        "✓".style(Style::new().green().bold()),
        removed,
        canonical_timestamp(cutoff).cyan()
    );
    Ok(())
}
