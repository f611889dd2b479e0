use anyhow::Result;
use chrono::Utc;
use choreo_core::book::ChoreBook;
use choreo_core::models::canonical_timestamp;
use choreo_core::store::TaskStore;
use choreo_core::timezone::format_local;
use owo_colors::{OwoColorize, Style};

use crate::cli::OccurrenceCommand;
use crate::config::Config;
use crate::util::resolve_occurrence;

/// Flips one occurrence between done and not done.
pub async fn toggle_done(
    book: &ChoreBook<impl TaskStore>,
    command: OccurrenceCommand,
    config: &Config,
) -> Result<()> {
    let now = Utc::now();
    let options = config.expand_options(now)?;
    let (task, instant) =
        resolve_occurrence(book, &command.id, &command.occurrence, &options, now).await?;

    let done = book.toggle_done(&command.id, instant, &options).await?;
    let when = format_local(instant, &options.timezone, "%a %Y-%m-%d %H:%M");
    if done {
        println!(
            "{} Marked done: {} on {}",
            "✓".style(Style::new().green().bold()),
            task.name.bright_white().bold(),
            when.cyan()
        );
    } else {
        println!(
            "{} Marked not done: {} on {}",
            "↺".style(Style::new().blue()),
            task.name.bright_white().bold(),
            when.cyan()
        );
    }
    Ok(())
}

/// Deletes one occurrence; the rest of the series stays.
pub async fn skip_occurrence(
    book: &ChoreBook<impl TaskStore>,
    command: OccurrenceCommand,
    config: &Config,
) -> Result<()> {
    let now = Utc::now();
    let options = config.expand_options(now)?;
    let (task, instant) =
        resolve_occurrence(book, &command.id, &command.occurrence, &options, now).await?;

    book.delete_occurrence(&command.id, instant, &options).await?;
    println!(
        "{} Skipped {} on {}",
        "✓".style(Style::new().green().bold()),
        task.name.bright_white().bold(),
        format_local(instant, &options.timezone, "%a %Y-%m-%d %H:%M").cyan()
    );
    println!(
        "  {} Undo with: choreo restore {} {}",
        "→".style(Style::new().blue()),
        command.id,
        canonical_timestamp(instant)
    );
    Ok(())
}

pub async fn restore_occurrence(
    book: &ChoreBook<impl TaskStore>,
    command: OccurrenceCommand,
    config: &Config,
) -> Result<()> {
    let now = Utc::now();
    let options = config.expand_options(now)?;
    let (task, instant) =
        resolve_occurrence(book, &command.id, &command.occurrence, &options, now).await?;

    if !task.is_deleted_at(instant) {
        println!("That occurrence of '{}' is not deleted.", task.name);
        return Ok(());
    }
    book.restore_occurrence(&command.id, instant, &options).await?;
    println!(
        "{} Restored {} on {}",
        "✓".style(Style::new().green().bold()),
        task.name.bright_white().bold(),
        format_local(instant, &options.timezone, "%a %Y-%m-%d %H:%M").cyan()
    );
    Ok(())
}
