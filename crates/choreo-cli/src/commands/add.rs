use anyhow::Result;
use chrono::Utc;
use choreo_core::book::ChoreBook;
use choreo_core::models::{NewTask, Repeat};
use choreo_core::store::TaskStore;
use choreo_core::timezone::format_local;
use owo_colors::{OwoColorize, Style};

use crate::cli::AddCommand;
use crate::config::Config;
use crate::parser::parse_when;
use crate::util::short_id;

pub async fn add_task(
    book: &ChoreBook<impl TaskStore>,
    command: AddCommand,
    config: &Config,
) -> Result<()> {
    let now = Utc::now();
    let tz = config.timezone()?;
    let date_time = command
        .at
        .as_deref()
        .map(|at| parse_when(at, &tz, now))
        .transpose()?;
    let repeat = Repeat::from(command.repeat);

    let requested_section = command.section.clone();
    let task = book
        .add(NewTask {
            name: command.name,
            date_time,
            repeat,
            section: command.section,
            description: command.description,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let warn_style = Style::new().yellow();

    println!(
        "{} Created chore: {}",
        "✓".style(success_style),
        task.name.bright_white().bold()
    );
    println!(
        "  {} ID: {}",
        "→".style(info_style),
        short_id(&task.id).yellow()
    );
    match task.anchor() {
        Some(anchor) => println!(
            "  {} First: {} ({})",
            "→".style(info_style),
            format_local(anchor, &tz, "%a %Y-%m-%d %H:%M").cyan(),
            task.repeat
        ),
        None => println!(
            "  {} No date; it is stored but never shown on the calendar",
            "→".style(info_style)
        ),
    }

    if let Some(requested) = requested_section.filter(|s| !s.trim().is_empty()) {
        if requested.trim() != task.section {
            println!(
                "  {} Section '{}' does not exist; filed under '{}'",
                "!".style(warn_style),
                requested,
                task.section
            );
        }
    }
    if matches!(task.repeat, Repeat::Custom) {
        println!(
            "  {} Custom repeat has no expansion rule; only the first occurrence is shown",
            "!".style(warn_style)
        );
    }

    Ok(())
}
