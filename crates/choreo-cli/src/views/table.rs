use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use choreo_core::agenda::AgendaSummary;
use choreo_core::models::{Occurrence, OccurrenceStatus, Repeat, Task};
use choreo_core::recurrence::{next_occurrence_after, ExpandOptions};
use choreo_core::timezone::{format_local, local_date};
use comfy_table::{Attribute, Cell, Color, Row, Table};
use owo_colors::OwoColorize;

use crate::util::short_id;

const WHEN_FORMAT: &str = "%a %Y-%m-%d %H:%M";

pub fn display_tasks(tasks: &[Task], options: &ExpandOptions, now: DateTime<Utc>) {
    if tasks.is_empty() {
        println!("No chores found.");
        return;
    }

    let tz = &options.timezone;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "First", "Repeat", "Next", "Section", "Marks"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_name = String::new();
        if task.repeat.advances() {
            display_name.push_str("↻ ");
        }
        display_name.push_str(&task.name);
        row.add_cell(Cell::new(display_name));

        row.add_cell(match task.anchor() {
            Some(anchor) => Cell::new(format_local(anchor, tz, WHEN_FORMAT)),
            None if task.date_time.is_some() => Cell::new("Invalid").fg(Color::Red),
            None => Cell::new("None").fg(Color::DarkGrey),
        });

        let repeat_cell = Cell::new(task.repeat.to_string());
        row.add_cell(match task.repeat {
            Repeat::Custom | Repeat::Other(_) => repeat_cell.fg(Color::Yellow),
            _ => repeat_cell,
        });

        row.add_cell(match next_occurrence_after(task, now, options) {
            Some(next) => Cell::new(next.humanize()),
            None => Cell::new("-").fg(Color::DarkGrey),
        });

        row.add_cell(Cell::new(&task.section));
        row.add_cell(Cell::new(format!(
            "{} done, {} deleted",
            task.done_dates.len(),
            task.deleted_dates.len()
        )));
        table.add_row(row);
    }

    println!("{table}");
}

/// Calendar view: one row per occurrence, today's rows in bold.
pub fn display_occurrences(occurrences: &[Occurrence], tz: &Tz, now: DateTime<Utc>) {
    if occurrences.is_empty() {
        println!("No occurrences found.");
        return;
    }

    let today = local_date(now, tz);
    let mut table = Table::new();
    table.set_header(vec!["ID", "When", "Chore", "Section", "Status", "Occurrence"]);

    for occurrence in occurrences {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&occurrence.task_id)));

        let mut when_cell = Cell::new(format!(
            "{} ({})",
            format_local(occurrence.occurs_at, tz, WHEN_FORMAT),
            occurrence.occurs_at.humanize()
        ));
        if local_date(occurrence.occurs_at, tz) == today {
            when_cell = when_cell.add_attribute(Attribute::Bold);
        }
        row.add_cell(when_cell);

        let title_cell = Cell::new(&occurrence.title);
        row.add_cell(match occurrence.status() {
            OccurrenceStatus::Done => title_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey),
            OccurrenceStatus::Overdue => title_cell.fg(Color::Red),
            OccurrenceStatus::Pending => title_cell,
        });

        row.add_cell(Cell::new(&occurrence.section));
        row.add_cell(status_cell(occurrence.status()));
        row.add_cell(Cell::new(&occurrence.timestamp).fg(Color::DarkGrey));
        table.add_row(row);
    }

    println!("{table}");
}

/// Today view: a checklist rather than a table.
pub fn display_checklist(occurrences: &[Occurrence], tz: &Tz) {
    if occurrences.is_empty() {
        println!("Nothing scheduled for today.");
        return;
    }

    for occurrence in occurrences {
        let time = format_local(occurrence.occurs_at, tz, "%H:%M");
        let id = short_id(&occurrence.task_id);
        match occurrence.status() {
            OccurrenceStatus::Done => println!(
                "[x] {} {} {}",
                time.bright_black(),
                occurrence.title.strikethrough(),
                id.bright_black()
            ),
            OccurrenceStatus::Overdue => println!(
                "[ ] {} {} {}",
                time.red(),
                occurrence.title.red(),
                id.bright_black()
            ),
            OccurrenceStatus::Pending => {
                println!("[ ] {} {} {}", time, occurrence.title, id.bright_black())
            }
        }
        if let Some(description) = &occurrence.description {
            println!("      {}", description.bright_black());
        }
    }
}

pub fn display_summary(summary: &AgendaSummary) {
    println!(
        "{} total, {}, {}, {} pending",
        summary.total,
        format!("{} done", summary.done).green(),
        format!("{} overdue", summary.overdue).red(),
        summary.pending
    );
}

pub fn display_sections(sections: &[String], counts: &[usize], default_count: usize) {
    let mut table = Table::new();
    table.set_header(vec!["Section", "Chores"]);
    for (section, count) in sections.iter().zip(counts) {
        table.add_row(vec![Cell::new(section), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new(choreo_core::models::DEFAULT_SECTION).fg(Color::DarkGrey),
        Cell::new(default_count),
    ]);
    println!("{table}");
}

fn status_cell(status: OccurrenceStatus) -> Cell {
    let cell = Cell::new(status.to_string());
    match status {
        OccurrenceStatus::Done => cell.fg(Color::Green),
        OccurrenceStatus::Overdue => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        OccurrenceStatus::Pending => cell,
    }
}
