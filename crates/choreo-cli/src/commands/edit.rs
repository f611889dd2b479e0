use anyhow::Result;
use chrono::Utc;
use choreo_core::book::ChoreBook;
use choreo_core::models::{Repeat, UpdateTask};
use choreo_core::store::TaskStore;
use owo_colors::{OwoColorize, Style};

use crate::cli::EditCommand;
use crate::config::Config;
use crate::parser::parse_when;

pub async fn edit_task(
    book: &ChoreBook<impl TaskStore>,
    command: EditCommand,
    config: &Config,
) -> Result<()> {
    let now = Utc::now();
    let tz = config.timezone()?;

    let date_time = if command.at_clear {
        Some(None)
    } else if let Some(at) = command.at.as_deref() {
        Some(Some(parse_when(at, &tz, now)?))
    } else {
        None
    };

    let description = if command.description_clear {
        Some(None)
    } else {
        command.description.map(Some)
    };

    let update = UpdateTask {
        name: command.name,
        date_time,
        repeat: command.repeat.map(Repeat::from),
        section: command.section.clone(),
        description,
    };

    let task = book.edit(&command.id, update).await?;
    println!(
        "{} Updated chore: {}",
        "✓".style(Style::new().green().bold()),
        task.name.bright_white().bold()
    );
    if let Some(requested) = command.section.filter(|s| !s.trim().is_empty()) {
        if requested.trim() != task.section {
            println!(
                "  {} Section '{}' does not exist; filed under '{}'",
                "!".yellow(),
                requested,
                task.section
            );
        }
    }
    if !task.done_dates.is_empty() || !task.deleted_dates.is_empty() {
        println!(
            "  {} Kept {} done and {} deleted marks; marks that no longer fall on an occurrence are ignored",
            "→".style(Style::new().blue()),
            task.done_dates.len(),
            task.deleted_dates.len()
        );
    }
    Ok(())
}
